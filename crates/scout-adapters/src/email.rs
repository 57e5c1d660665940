//! Contact email extraction from free-form bio text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9][a-z0-9._%+-]*@[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*\.[a-z]{2,}\b")
        .expect("valid email regex")
});

/// Extract lower-cased, de-duplicated email addresses in order of appearance.
///
/// Handles the common bio obfuscations `name [at] domain [dot] com` and
/// `name(at)domain.com` before matching.
#[must_use]
pub fn extract_emails(text: &str) -> Vec<String> {
    let normalized = deobfuscate(text);
    let mut seen = HashSet::new();
    EMAIL_RE
        .find_iter(&normalized)
        .map(|m| m.as_str().trim_end_matches('.').to_lowercase())
        .filter(|e| seen.insert(e.clone()))
        .collect()
}

fn deobfuscate(text: &str) -> String {
    let mut out = text.to_string();
    for (pattern, replacement) in [
        (" [at] ", "@"),
        ("[at]", "@"),
        ("(at)", "@"),
        (" [dot] ", "."),
        ("[dot]", "."),
        ("(dot)", "."),
    ] {
        out = replace_ignore_ascii_case(&out, pattern, replacement);
    }
    out
}

fn replace_ignore_ascii_case(haystack: &str, needle: &str, replacement: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for (idx, _) in lower.match_indices(needle) {
        out.push_str(&haystack[last..idx]);
        out.push_str(replacement);
        last = idx + needle.len();
    }
    out.push_str(&haystack[last..]);
    out
}
