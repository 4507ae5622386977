//! CORS for credentialed admin routes.
//!
//! The allowed origin is the request's own `Origin` when present, else the
//! frontend URL from the environment, else the configured default. A wildcard
//! is never sent since the admin site calls with credentials.

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::config::env::RuntimeEnv;
use crate::config::schema::CorsConfig;
use crate::http::server::AppState;

/// Resolved CORS settings.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    default_origin: String,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Self {
        Self {
            default_origin: config.default_origin.clone(),
            allow_methods: HeaderValue::from_str(&config.allow_methods)
                .unwrap_or_else(|_| HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS")),
            allow_headers: HeaderValue::from_str(&config.allow_headers)
                .unwrap_or_else(|_| HeaderValue::from_static("Content-Type, Authorization, X-CSRF-Token, Cookie")),
        }
    }

    /// Origin to allow for a request carrying `request_origin`.
    pub fn allowed_origin(&self, request_origin: Option<&HeaderValue>, env: &RuntimeEnv) -> HeaderValue {
        if let Some(origin) = request_origin.filter(|o| !o.is_empty()) {
            return origin.clone();
        }

        let fallback = env.frontend_url.as_deref().unwrap_or(&self.default_origin);
        HeaderValue::from_str(fallback.trim_end_matches('/'))
            .unwrap_or_else(|_| HeaderValue::from_static("null"))
    }

    /// Write the CORS header set onto `headers`.
    pub fn apply(&self, headers: &mut HeaderMap, origin: HeaderValue) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        headers.append(VARY, HeaderValue::from_static("Origin"));
    }
}

/// Decorate every response, errors included, with the CORS header set.
pub async fn cors_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let origin = state
        .cors
        .allowed_origin(request.headers().get(ORIGIN), &state.runtime_env());

    let mut response = next.run(request).await;
    state.cors.apply(response.headers_mut(), origin);
    response
}

/// `OPTIONS` handler. Never contacts the backend.
pub async fn preflight() -> impl IntoResponse {
    Json(json!({}))
}
