//! Login and logout relays.
//!
//! The gateway never looks inside the session cookie. Login forwards the
//! credentials and relays whatever cookies the backend issues; logout relays
//! the backend's cookies and then expires both session cookies itself.

use axum::extract::{Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::admin::form::BufferedRequest;
use crate::error::GatewayError;
use crate::http::cookies::{clearing_cookie, relay_set_cookies};
use crate::http::request::request_id;
use crate::http::response::{decode_backend_json, relay_backend};
use crate::http::server::AppState;
use crate::upstream::{endpoint, forward_headers, BackendRequest, ForwardBody};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    identifier: &'a str,
    password: &'a str,
}

/// `POST /api/admin/auth/login`
///
/// Both credentials are trimmed before they are checked and forwarded.
pub async fn login(State(state): State<AppState>, request: Request) -> Result<Response, GatewayError> {
    let inbound = BufferedRequest::read(request, state.config.listener.max_body_bytes).await?;
    let headers = &inbound.headers;
    let payload: LoginRequest =
        serde_json::from_slice(&inbound.body).map_err(|_| GatewayError::invalid("Invalid request body"))?;

    let identifier = payload.identifier.as_deref().map(str::trim).unwrap_or_default();
    if identifier.is_empty() {
        return Err(GatewayError::invalid("Email or username is required"));
    }
    let password = payload.password.as_deref().map(str::trim).unwrap_or_default();
    if password.is_empty() {
        return Err(GatewayError::invalid("Password is required"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(GatewayError::invalid(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let credentials = serde_json::to_vec(&Credentials { identifier, password })
        .map_err(|e| GatewayError::invalid(e.to_string()))?;

    tracing::info!(
        request_id = %request_id(headers),
        identifier_len = identifier.len(),
        "Forwarding login"
    );

    let url = endpoint(&state.backend_url(), "/api/admin/auth/login");
    let request = BackendRequest::new(Method::POST, url)
        .headers(forward_headers(headers, ForwardBody::Json))
        .body(credentials);

    let response = state.call_backend(request, &state.write_policy()).await?;
    relay_backend(response, None)
}

/// `POST /api/admin/auth/logout`. Always ends with both session cookies expired.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let url = endpoint(&state.backend_url(), "/api/admin/auth/logout");
    let request = BackendRequest::new(Method::POST, url).headers(forward_headers(&headers, ForwardBody::Json));

    let mut reply = match backend_logout(&state, request).await {
        Ok(reply) => reply,
        Err(err) => {
            tracing::warn!(
                request_id = %request_id(&headers),
                error = %err,
                "Backend logout failed, clearing cookies locally"
            );
            (
                StatusCode::OK,
                Json(json!({"success": true, "message": "Logged out"})),
            )
                .into_response()
        }
    };

    let production = state.is_production();
    for name in [&state.config.session.cookie_name, &state.config.session.legacy_cookie_name] {
        match HeaderValue::from_str(&clearing_cookie(name, production)) {
            Ok(value) => {
                reply.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!(cookie = %name, error = %e, "Invalid session cookie name"),
        }
    }

    reply
}

/// The backend's logout answer with its status, body and cookies.
async fn backend_logout(state: &AppState, request: BackendRequest) -> Result<Response, GatewayError> {
    let response = state.call_backend(request, &state.write_policy()).await?;
    let body = decode_backend_json(&response)?;

    let mut reply = (response.status, Json(body)).into_response();
    relay_set_cookies(Some(&response.headers), Some(reply.headers_mut()));
    Ok(reply)
}
