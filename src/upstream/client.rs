//! Resilient backend client.
//!
//! Wraps a [`Transport`] with a per-attempt deadline and bounded,
//! sequential retries:
//!
//! ```text
//! attempt 0 ──▶ ok (<500)        → return response
//!           ──▶ 5xx / transport  → sleep min(base*2^0, cap) → attempt 1 ...
//! last attempt ──▶ 5xx           → return response as-is
//!              ──▶ transport     → return the error
//! ```

use std::sync::Arc;

use crate::observability::metrics;
use crate::resilience::retries::{is_retryable, RetryPolicy};
use crate::resilience::timeouts::{with_deadline, Elapsed};
use crate::upstream::transport::{BackendRequest, BackendResponse, Transport, TransportError};

/// Client used by every handler to reach the backend.
#[derive(Clone)]
pub struct BackendClient {
    transport: Arc<dyn Transport>,
}

impl BackendClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send `request`, retrying per `policy`.
    ///
    /// Makes at most `policy.max_retries + 1` attempts. Statuses below 500
    /// return immediately. A 5xx on the final attempt is returned, not raised.
    pub async fn send(
        &self,
        request: BackendRequest,
        policy: &RetryPolicy,
    ) -> Result<BackendResponse, TransportError> {
        let max_attempts = policy.max_attempts();
        let mut attempt = 0;

        loop {
            let outcome = match with_deadline(policy.timeout, self.transport.send(request.clone())).await {
                Ok(result) => result,
                Err(Elapsed(limit)) => Err(TransportError::Timeout {
                    url: request.url.clone(),
                    timeout: limit,
                }),
            };
            let has_next = attempt + 1 < max_attempts;

            match outcome {
                Ok(response) => {
                    let status = response.status;
                    if has_next && is_retryable(Some(status)) {
                        metrics::record_backend_attempt("server_error");
                        let delay = policy.delay_after(attempt);
                        tracing::info!(
                            method = %request.method,
                            url = %request.url,
                            attempt,
                            status = %status,
                            delay = ?delay,
                            "Retrying backend request"
                        );
                        metrics::record_retry();
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    metrics::record_backend_attempt(if status.is_server_error() { "server_error" } else { "ok" });
                    tracing::debug!(
                        method = %request.method,
                        url = %request.url,
                        status = %status,
                        attempts = attempt + 1,
                        "Backend responded"
                    );
                    return Ok(response);
                }
                Err(err) => {
                    metrics::record_backend_attempt(err.kind());
                    if has_next && err.is_retryable() {
                        let delay = policy.delay_after(attempt);
                        tracing::warn!(
                            method = %request.method,
                            url = %request.url,
                            attempt,
                            error = %err,
                            delay = ?delay,
                            "Retrying after transport error"
                        );
                        metrics::record_retry();
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    tracing::error!(
                        method = %request.method,
                        url = %request.url,
                        attempts = attempt + 1,
                        error = %err,
                        "Backend request failed"
                    );
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::transport::mock::{MockOutcome, MockTransport};
    use axum::http::{Method, StatusCode};
    use std::time::Duration;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_millis(200),
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    fn get(url: &str) -> BackendRequest {
        BackendRequest::new(Method::GET, url)
    }

    #[tokio::test]
    async fn test_persistent_503_is_returned_after_all_attempts() {
        let transport = Arc::new(MockTransport::always(MockOutcome::status(503, "down")));
        let client = BackendClient::new(transport.clone());

        let response = client.send(get("http://backend/x"), &fast_policy(3)).await.unwrap();

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(transport.calls(), 4);
    }

    #[tokio::test]
    async fn test_persistent_network_error_is_raised_after_all_attempts() {
        let transport = Arc::new(MockTransport::always(MockOutcome::Fail("connection refused".into())));
        let client = BackendClient::new(transport.clone());

        let err = client.send(get("http://backend/x"), &fast_policy(2)).await.unwrap_err();

        assert!(matches!(err, TransportError::Network { ref message, .. } if message == "connection refused"));
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_404_is_not_retried() {
        let transport = Arc::new(MockTransport::always(MockOutcome::status(404, "{}")));
        let client = BackendClient::new(transport.clone());

        let response = client.send(get("http://backend/x"), &fast_policy(5)).await.unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let transport = Arc::new(MockTransport::new(vec![
            MockOutcome::status(502, "bad gateway"),
            MockOutcome::Fail("reset".into()),
            MockOutcome::status(200, "{\"success\":true}"),
        ]));
        let client = BackendClient::new(transport.clone());

        let response = client.send(get("http://backend/x"), &fast_policy(2)).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_retryable_failure() {
        let transport = Arc::new(MockTransport::always(MockOutcome::Hang));
        let client = BackendClient::new(transport.clone());
        let policy = RetryPolicy {
            timeout: Duration::from_millis(20),
            ..fast_policy(1)
        };

        let err = client.send(get("http://backend/slow"), &policy).await.unwrap_err();

        assert!(matches!(err, TransportError::Timeout { timeout, .. } if timeout == Duration::from_millis(20)));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_zero_retries_means_single_attempt() {
        let transport = Arc::new(MockTransport::always(MockOutcome::status(500, "boom")));
        let client = BackendClient::new(transport.clone());

        let response = client.send(get("http://backend/x"), &fast_policy(0)).await.unwrap();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_is_not_retried() {
        struct Broken;

        #[async_trait::async_trait]
        impl Transport for Broken {
            async fn send(&self, _: BackendRequest) -> Result<BackendResponse, TransportError> {
                Err(TransportError::InvalidRequest("relative URL".into()))
            }
        }

        let client = BackendClient::new(Arc::new(Broken));
        let err = client.send(get("/nope"), &fast_policy(3)).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }
}
