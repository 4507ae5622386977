//! The outbound HTTP seam.
//!
//! Handlers never talk to an HTTP client directly; they go through
//! [`Transport`] so tests can script backend behaviour and count calls.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// A fully buffered request to the backend.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl BackendRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A fully buffered backend response.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl BackendResponse {
    /// The body as text. Invalid UTF-8 is replaced, never rejected.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport-level failures. A backend answering with an error status is not
/// one of these.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} timed out after {}ms", .timeout.as_millis())]
    Timeout { url: String, timeout: Duration },

    #[error("network error calling {url}: {message}")]
    Network { url: String, message: String },

    #[error("invalid backend request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransportError::InvalidRequest(_))
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Timeout { .. } => "timeout",
            TransportError::Network { .. } => "network",
            TransportError::InvalidRequest(_) => "invalid",
        }
    }
}

/// Sends a single request to the backend. One call is one attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, TransportError>;
}

/// [`Transport`] backed by a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, TransportError> {
        let url = request.url.clone();
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| map_reqwest_error(&url, e))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| map_reqwest_error(&url, e))?;

        Ok(BackendResponse { status, headers, body })
    }
}

fn map_reqwest_error(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
