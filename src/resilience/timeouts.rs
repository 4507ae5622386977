//! Timeout enforcement.
//!
//! Every outbound attempt runs under its own deadline, and each routed request
//! runs under `timeouts.request_secs`. Dropping the future on expiry aborts the
//! in-flight call.

use std::future::Future;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::GatewayError;
use crate::http::server::AppState;

/// Marker returned when a deadline expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed(pub Duration);

/// Run `fut` with a hard deadline.
pub async fn with_deadline<F, T>(limit: Duration, fut: F) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| Elapsed(limit))
}

/// Route middleware bounding the whole request, retries included.
///
/// An expired deadline is reported like an exhausted backend call, so it sits
/// inside the CORS layer on admin routes.
pub async fn request_deadline(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let limit = Duration::from_secs(state.config.timeouts.request_secs);
    match with_deadline(limit, next.run(request)).await {
        Ok(response) => response,
        Err(Elapsed(limit)) => GatewayError::Deadline {
            backend_url: state.backend_url(),
            limit,
        }
        .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deadline_expires() {
        let res = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            1
        })
        .await;
        assert_eq!(res, Err(Elapsed(Duration::from_millis(10))));
    }

    #[tokio::test]
    async fn test_fast_future_completes() {
        let res = with_deadline(Duration::from_secs(1), async { 7 }).await;
        assert_eq!(res, Ok(7));
    }
}
