//! Retry with exponential back-off for catalog and feed requests.
//!
//! Transient failures (network errors, 429, 5xx) are retried; everything else
//! is returned to the caller on the first failure.

use std::future::Future;
use std::time::Duration;

use crate::error::AppStoreError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable:
/// - [`AppStoreError::Http`]: connection reset, timeout, TLS hiccup.
/// - [`AppStoreError::RateLimited`]: HTTP 429.
/// - [`AppStoreError::UnexpectedStatus`] with a 5xx status.
///
/// Not retriable: 404, other 4xx, undecodable bodies, bad base URLs.
fn is_retriable(err: &AppStoreError) -> bool {
    match err {
        AppStoreError::Http(_) | AppStoreError::RateLimited { .. } => true,
        AppStoreError::UnexpectedStatus { status, .. } => *status >= 500,
        AppStoreError::Deserialize { .. }
        | AppStoreError::NotFound { .. }
        | AppStoreError::InvalidBaseUrl { .. }
        | AppStoreError::Snapshot { .. } => false,
    }
}

/// Executes `operation`, retrying transient errors up to `max_retries`
/// additional times.
///
/// The wait before the n-th retry is `backoff_base_ms * 2^(n-1)` with
/// ±25 % jitter, capped at 30 s. A `backoff_base_ms` of `0` retries
/// without sleeping.
///
/// | Attempt | Sleep before next attempt (`backoff_base_ms = 500`) |
/// |---------|------------------------------------------------------|
/// | 1       | 500 ms ± 25 %                                        |
/// | 2       | 1 000 ms ± 25 %                                      |
/// | 3       | 2 000 ms ± 25 %                                      |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, AppStoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppStoreError>>,
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
                let delay_ms = backoff_delay_ms(backoff_base_ms, attempt);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient catalog error, retrying after back-off"
                );
                if delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn backoff_delay_ms(backoff_base_ms: u64, attempt: u32) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn server_error() -> AppStoreError {
        AppStoreError::UnexpectedStatus {
            status: 503,
            url: "https://catalog.test/lookup".to_owned(),
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, AppStoreError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_server_errors_then_succeeds() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                let n = cc.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(server_error())
                } else {
                    Ok::<u32, AppStoreError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn propagates_last_error_after_exhausting_retries() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(2, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, AppStoreError>(AppStoreError::RateLimited {
                    retry_after_secs: 0,
                })
            }
        })
        .await;
        // max_retries=2 → 3 total attempts
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(AppStoreError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_not_found_or_client_errors() {
        for err in [
            AppStoreError::NotFound {
                url: "https://catalog.test/lookup".to_owned(),
            },
            AppStoreError::UnexpectedStatus {
                status: 403,
                url: "https://catalog.test/lookup".to_owned(),
            },
        ] {
            let call_count = Arc::new(AtomicU32::new(0));
            let cc = Arc::clone(&call_count);
            let mut slot = Some(err);
            let result = retry_with_backoff(3, 0, || {
                let cc = Arc::clone(&cc);
                let next = slot.take();
                async move {
                    cc.fetch_add(1, Ordering::SeqCst);
                    match next {
                        Some(e) => Err::<u32, AppStoreError>(e),
                        None => Ok(0),
                    }
                }
            })
            .await;
            assert_eq!(call_count.load(Ordering::SeqCst), 1);
            assert!(result.is_err());
        }
    }

    #[test]
    fn backoff_is_zero_when_base_is_zero() {
        assert_eq!(backoff_delay_ms(0, 1), 0);
        assert_eq!(backoff_delay_ms(0, 5), 0);
    }

    #[test]
    fn backoff_grows_and_stays_within_jitter_band() {
        for attempt in 1..=3u32 {
            let nominal = 400u64 << (attempt - 1);
            let delay = backoff_delay_ms(400, attempt);
            assert!(delay >= nominal * 3 / 4, "attempt {attempt}: {delay}");
            assert!(delay <= nominal * 5 / 4, "attempt {attempt}: {delay}");
        }
    }

    #[test]
    fn backoff_is_capped() {
        assert!(backoff_delay_ms(10_000, 10) <= MAX_DELAY_MS * 5 / 4);
    }
}
