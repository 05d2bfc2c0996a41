//! Bounded retry with exponential back-off for directory requests.
//!
//! [`retry_with_backoff`] wraps a fallible async request and retries only
//! transport-level trouble (connection refused/reset, timeouts, 429 and 5xx
//! responses). A 2xx response whose body describes an error is not a
//! transport failure and is returned to the caller as-is.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 60_000;

/// Upper bound on a server-requested `Retry-After` wait.
const MAX_RETRY_AFTER_MS: u64 = 300_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - [`ScraperError::Http`] raised by the connection itself: connect,
///   timeout, request or body I/O.
/// - [`ScraperError::RateLimited`]: HTTP 429.
/// - [`ScraperError::UnexpectedStatus`] with a 5xx code.
///
/// **Not retriable:** builder/redirect/decode failures, 4xx statuses, and
/// anything found while reading the page ([`ScraperError::MissingField`],
/// [`ScraperError::InvalidUrl`], [`ScraperError::DetailUnavailable`]).
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request() || e.is_body(),
        ScraperError::RateLimited { .. } => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::MissingField { .. }
        | ScraperError::InvalidUrl { .. }
        | ScraperError::DetailUnavailable { .. } => false,
    }
}

/// Computes the sleep before retry number `attempt` (1-based), before jitter.
fn backoff_delay_ms(backoff_base_ms: u64, attempt: u32) -> u64 {
    backoff_base_ms
        .saturating_mul(1u64 << (attempt.saturating_sub(1)).min(10))
        .min(MAX_DELAY_MS)
}

/// Minimum sleep the server asked for before retrying `err`, or 0.
fn retry_after_floor_ms(err: &ScraperError) -> u64 {
    match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => retry_after_secs
            .saturating_mul(1_000)
            .min(MAX_RETRY_AFTER_MS),
        _ => 0,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 5_000`:
///
/// | Retry | Sleep before it                |
/// |-------|--------------------------------|
/// | 1     | 5 000 ms × 2⁰ ± 25 % jitter    |
/// | 2     | 5 000 ms × 2¹ ± 25 % jitter    |
/// | 3     | 5 000 ms × 2² ± 25 % jitter    |
///
/// Delay is capped at 60 s. A 429 carrying `Retry-After` sleeps at least that
/// long (up to 5 min) even when the back-off is shorter. When every attempt fails the last error is
/// returned; non-retriable errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = backoff_delay_ms(backoff_base_ms, attempt);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let delay_ms = jittered_ms.max(retry_after_floor_ms(&err));
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient directory error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
