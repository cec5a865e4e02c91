//! Retry policy for chart requests.
//!
//! A chart request is retried when the transport times out or cannot
//! connect, or when Yahoo answers 429 or 5xx. An error object in the body
//! (unknown symbol), a malformed body, or bad input is returned on the first
//! attempt.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};

use crate::error::MarketError;

const MAX_DELAY_MS: u64 = 30_000;

/// Turns a rate-limit or server-error response into
/// [`MarketError::Unavailable`]. Any other response is passed through so the
/// caller can read the error object Yahoo puts in 4xx bodies.
pub(crate) fn check_status(response: Response) -> Result<Response, MarketError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Err(MarketError::Unavailable {
            status: status.as_u16(),
        });
    }
    Ok(response)
}

pub(crate) fn is_retriable(err: &MarketError) -> bool {
    match err {
        MarketError::Http(e) => e.is_timeout() || e.is_connect(),
        MarketError::Unavailable { .. } => true,
        MarketError::Api(_)
        | MarketError::NoData(_)
        | MarketError::Deserialize { .. }
        | MarketError::Csv(_)
        | MarketError::InvalidBaseUrl { .. }
        | MarketError::InvalidRange { .. } => false,
    }
}

/// Delay before retry number `attempt` (1-based): `base_ms × 2^(attempt-1)`,
/// capped at 30 s, then scaled by `0.75 + 0.5 × jitter` for `jitter` in
/// `[0, 1)`.
pub(crate) fn backoff_delay(attempt: u32, base_ms: u64, jitter: f64) -> Duration {
    let exponent = attempt.saturating_sub(1).min(10);
    let capped = base_ms.saturating_mul(1u64 << exponent).min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let millis = (capped as f64 * (0.75 + 0.5 * jitter.clamp(0.0, 1.0))) as u64;
    Duration::from_millis(millis)
}

/// Runs `request` once, then up to `max_retries` more times while it fails
/// with a retriable error, sleeping [`backoff_delay`] between attempts.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut request: F,
) -> Result<T, MarketError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MarketError>>,
{
    let mut retries = 0u32;
    loop {
        let err = match request().await {
            Ok(value) => return Ok(value),
            Err(err) if retries < max_retries && is_retriable(&err) => err,
            Err(err) => return Err(err),
        };
        retries += 1;
        let delay = backoff_delay(retries, backoff_base_ms, rand::random::<f64>());
        tracing::warn!(
            retry = retries,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "chart request failed; backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    async fn connect_error() -> MarketError {
        let err = reqwest::Client::new()
            .get("http://0.0.0.0:1")
            .send()
            .await
            .unwrap_err();
        MarketError::Http(err)
    }

    #[test]
    fn api_error_is_not_retriable() {
        assert!(!is_retriable(&MarketError::Api("Not Found".to_owned())));
        assert!(!is_retriable(&MarketError::NoData("X".to_owned())));
    }

    #[test]
    fn unavailable_is_retriable() {
        assert!(is_retriable(&MarketError::Unavailable { status: 429 }));
        assert!(is_retriable(&MarketError::Unavailable { status: 503 }));
    }

    #[tokio::test]
    async fn connect_error_is_retriable() {
        assert!(is_retriable(&connect_error().await));
    }

    #[test]
    fn backoff_doubles_within_jitter_band() {
        assert_eq!(backoff_delay(1, 400, 0.5), Duration::from_millis(400));
        assert_eq!(backoff_delay(3, 400, 0.5), Duration::from_millis(1600));
        assert_eq!(backoff_delay(2, 400, 0.0), Duration::from_millis(600));
        assert_eq!(backoff_delay(2, 400, 1.0), Duration::from_millis(1000));
    }

    #[test]
    fn backoff_is_capped() {
        assert_eq!(backoff_delay(40, 1_000, 0.5), Duration::from_millis(30_000));
        assert_eq!(backoff_delay(1, u64::MAX, 0.0), Duration::from_millis(22_500));
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(MarketError::Unavailable { status: 502 })
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<u32, _> = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(connect_error().await)
            }
        })
        .await;
        assert!(matches!(result, Err(MarketError::Http(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_api_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<u32, _> = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(MarketError::Api("Not Found".to_owned()))
            }
        })
        .await;
        assert!(matches!(result, Err(MarketError::Api(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
