//! Bounded retry with exponential backoff and jitter for adapter calls.
//!
//! Adapters make exactly one provider request per call; the pipeline wraps
//! fetches in [`retry_with_backoff`] so transient failures (timeouts, 429,
//! 5xx, connection resets) are retried a small fixed number of times before
//! the keyword is given up on. Non-transient errors are returned at once.

use std::future::Future;
use std::time::Duration;

use crate::error::AdapterError;

/// Upper bound on any single backoff sleep.
const MAX_DELAY_MS: u64 = 30_000;

/// Executes `operation` with up to `max_retries` additional attempts on
/// transient errors (see [`AdapterError::is_transient`]).
///
/// Backoff before retry *n* (1-based) is `backoff_base_ms * 2^(n-1)` with
/// ±25 % jitter, raised to the provider's `Retry-After` when rate limited and
/// capped at 30 s.
///
/// | Attempt | Sleep before next attempt (`backoff_base_ms = 500`) |
/// |---------|------------------------------------------------------|
/// | 1       | 500 ms ± 25 %                                        |
/// | 2       | 1 000 ms ± 25 %                                      |
/// | 3       | 2 000 ms ± 25 %                                      |
///
/// With `max_retries = 2` the operation runs at most 3 times.
///
/// # Errors
///
/// Returns the first non-transient error, or the last transient error once
/// retries are exhausted.
pub async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, AdapterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AdapterError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(&err, attempt, backoff_base_ms);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient adapter error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

fn backoff_delay_ms(err: &AdapterError, attempt: u32, backoff_base_ms: u64) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (computed as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
    let floor = match err {
        AdapterError::RateLimited {
            retry_after_secs, ..
        } if backoff_base_ms > 0 => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };
    jittered.max(floor).min(MAX_DELAY_MS)
}
