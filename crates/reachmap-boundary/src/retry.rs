//! Retry with exponential back-off and jitter for boundary lookups.
//!
//! [`retry_with_backoff`] wraps a fallible async operation and retries on
//! transient errors (network failures, timeouts, 5xx). Everything else is
//! returned on the first failure.

use std::future::Future;
use std::time::Duration;

use crate::error::BoundaryError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Timeouts, connection failures, 429 and 5xx responses are retriable.
/// Malformed bodies and bad geometry are not: a second request returns the
/// same bytes.
pub(crate) fn is_retriable(err: &BoundaryError) -> bool {
    match err {
        BoundaryError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|s| {
                    s.is_server_error() || s == reqwest::StatusCode::TOO_MANY_REQUESTS
                })
        }
        BoundaryError::InvalidBaseUrl { .. }
        | BoundaryError::Deserialize { .. }
        | BoundaryError::InvalidGeometry(_)
        | BoundaryError::Timeout(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors.
///
/// The delay before retry `n` is `backoff_base_ms × 2ⁿ⁻¹` with ±25 % jitter,
/// capped at 10 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, BoundaryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BoundaryError>>,
{
    const MAX_DELAY_MS: u64 = 10_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "boundary lookup failed, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
