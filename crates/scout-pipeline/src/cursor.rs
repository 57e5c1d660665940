//! Per-keyword pagination state.

/// Opaque provider cursor plus the number of pages fetched for one keyword.
///
/// The first page is free; every later page is a *continuation run* and
/// counts against `max_continuation_runs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchCursor {
    token: Option<String>,
    pages_fetched: u32,
    exhausted: bool,
}

impl FetchCursor {
    #[must_use]
    pub fn start() -> Self {
        Self::default()
    }

    /// Token to send with the next request; `None` before the first page.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    #[must_use]
    pub fn continuation_runs(&self) -> u32 {
        self.pages_fetched.saturating_sub(1)
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Whether another page may be requested under the continuation cap.
    #[must_use]
    pub fn may_fetch(&self, max_continuation_runs: u32) -> bool {
        !self.exhausted && self.pages_fetched <= max_continuation_runs
    }

    /// Record a fetched page and the provider's cursor for the next one.
    pub fn advance(&mut self, next: Option<String>) {
        self.pages_fetched = self.pages_fetched.saturating_add(1);
        self.exhausted = next.is_none();
        self.token = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_is_always_allowed() {
        let cursor = FetchCursor::start();
        assert!(cursor.may_fetch(0));
        assert!(cursor.token().is_none());
    }

    #[test]
    fn continuation_cap_bounds_total_pages() {
        let mut cursor = FetchCursor::start();
        let mut pages = 0;
        while cursor.may_fetch(2) {
            cursor.advance(Some(format!("c{pages}")));
            pages += 1;
        }
        assert_eq!(pages, 3);
        assert_eq!(cursor.continuation_runs(), 2);
        assert_eq!(cursor.token(), Some("c2"));
    }

    #[test]
    fn missing_next_cursor_marks_exhausted() {
        let mut cursor = FetchCursor::start();
        cursor.advance(None);
        assert!(cursor.is_exhausted());
        assert!(!cursor.may_fetch(10));
    }
}
