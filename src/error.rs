//! Gateway error taxonomy.
//!
//! Every failure a handler can produce maps to a structured JSON body
//! (`success: false`, `message`, `error`) so nothing raw reaches the client:
//!
//! | Variant | Status | Backend called? |
//! |---|---|---|
//! | `MissingSession`, `InvalidInput`, `InvalidForm` | 401 / 400 | no |
//! | `PayloadTooLarge` | 413 | no |
//! | `NotFound` | 404 | maybe |
//! | `Transport`, `Deadline` | 500 | yes, retries exhausted or cut short |
//! | `BackendContract` | 500 | yes, body was not JSON |
//! | `Backend` | backend's own | yes, relayed verbatim |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::upstream::TransportError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Authentication required")]
    MissingSession,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Failed to parse form data: {0}")]
    InvalidForm(String),

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to connect to backend: {source}")]
    Transport {
        backend_url: String,
        #[source]
        source: TransportError,
    },

    #[error("request did not complete within {}s", .limit.as_secs())]
    Deadline { backend_url: String, limit: Duration },

    #[error("{message}")]
    BackendContract {
        message: &'static str,
        backend_status: StatusCode,
        preview: String,
        parse_error: String,
        html_title: Option<String>,
        html_h1: Option<String>,
    },

    #[error("backend returned {status}")]
    Backend { status: StatusCode, body: Value },
}

impl GatewayError {
    pub fn invalid(message: impl Into<String>) -> Self {
        GatewayError::InvalidInput(message.into())
    }

    pub fn transport(backend_url: impl Into<String>, source: TransportError) -> Self {
        GatewayError::Transport {
            backend_url: backend_url.into(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingSession => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidInput(_) | GatewayError::InvalidForm(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Transport { .. } | GatewayError::Deadline { .. } | GatewayError::BackendContract { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::Backend { status, .. } => *status,
        }
    }

    fn body(self) -> Value {
        match self {
            GatewayError::MissingSession => failure("Authentication required", "Authentication required"),
            GatewayError::InvalidInput(message) | GatewayError::NotFound(message) => {
                failure(&message, &message)
            }
            GatewayError::InvalidForm(detail) => failure("Failed to parse form data", &detail),
            GatewayError::PayloadTooLarge { limit } => {
                failure("Request body too large", &format!("body exceeds the {limit} byte limit"))
            }
            GatewayError::Transport { backend_url, source } => json!({
                "success": false,
                "message": "Failed to connect to backend",
                "error": source.to_string(),
                "backend_url": backend_url,
            }),
            GatewayError::Deadline { backend_url, limit } => json!({
                "success": false,
                "message": "Failed to connect to backend",
                "error": format!("request did not complete within {}s", limit.as_secs()),
                "backend_url": backend_url,
            }),
            GatewayError::BackendContract {
                message,
                backend_status,
                preview,
                parse_error,
                html_title,
                html_h1,
            } => {
                let mut body = json!({
                    "success": false,
                    "message": message,
                    "error": preview,
                    "parse_error": parse_error,
                    "backend_status": backend_status.as_u16(),
                });
                if let Some(title) = html_title {
                    body["html_title"] = Value::String(title);
                }
                if let Some(h1) = html_h1 {
                    body["html_h1"] = Value::String(h1);
                }
                body
            }
            GatewayError::Backend { body, .. } => body,
        }
    }
}

fn failure(message: &str, error: &str) -> Value {
    json!({
        "success": false,
        "message": message,
        "error": error,
    })
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            GatewayError::Transport { .. } | GatewayError::Deadline { .. } | GatewayError::BackendContract { .. } => {
                tracing::error!(status = %status, error = %self, "Request failed");
            }
            GatewayError::Backend { .. } => {
                tracing::info!(status = %status, "Relaying backend error response");
            }
            _ => {
                tracing::warn!(status = %status, error = %self, "Request rejected");
            }
        }

        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_session_shape() {
        let response = GatewayError::MissingSession.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Authentication required");
    }

    #[tokio::test]
    async fn test_backend_error_is_relayed_verbatim() {
        let payload = json!({"success": false, "message": "Post not found", "code": "E_NOPOST"});
        let response = GatewayError::Backend {
            status: StatusCode::NOT_FOUND,
            body: payload.clone(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, payload);
    }

    #[tokio::test]
    async fn test_payload_too_large_shape() {
        let response = GatewayError::PayloadTooLarge { limit: 16 }.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Request body too large");
        assert_eq!(body["error"], "body exceeds the 16 byte limit");
    }

    #[tokio::test]
    async fn test_deadline_is_a_structured_500() {
        let response = GatewayError::Deadline {
            backend_url: "http://backend".into(),
            limit: Duration::from_secs(1),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to connect to backend");
        assert_eq!(body["error"], "request did not complete within 1s");
        assert_eq!(body["backend_url"], "http://backend");
    }

    #[tokio::test]
    async fn test_transport_error_reports_backend_url() {
        let err = GatewayError::transport(
            "http://backend/api/x",
            TransportError::Network {
                url: "http://backend/api/x".into(),
                message: "connection refused".into(),
            },
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to connect to backend");
        assert_eq!(body["backend_url"], "http://backend/api/x");
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }
}
