//! Shared fixtures for handler tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Response;
use axum::Router;
use serde_json::Value;

use crate::config::{EnvProvider, GatewayConfig, RuntimeEnv};
use crate::http::server::{AppState, HttpServer};
use crate::upstream::transport::mock::MockTransport;

pub const BACKEND: &str = "http://backend.test";

pub fn gateway(transport: Arc<MockTransport>) -> Router {
    gateway_with_env(transport, RuntimeEnv::with_backend(BACKEND))
}

pub fn gateway_with_env(transport: Arc<MockTransport>, env: RuntimeEnv) -> Router {
    build(transport, env, fast_config())
}

pub fn gateway_with_config(transport: Arc<MockTransport>, config: GatewayConfig) -> Router {
    build(transport, RuntimeEnv::with_backend(BACKEND), config)
}

/// Defaults with millisecond backoff.
pub fn fast_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.retries.base_delay_ms = 1;
    config.retries.max_delay_ms = 2;
    config
}

fn build(transport: Arc<MockTransport>, env: RuntimeEnv, config: GatewayConfig) -> Router {
    HttpServer::with_state(AppState::new(config, EnvProvider::Fixed(env), transport)).router()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A multipart body with text fields and one optional file.
pub fn multipart(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> (String, Vec<u8>) {
    let boundary = "gatewaytestboundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    if let Some((name, file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}
