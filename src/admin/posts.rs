//! Post create, update and delete.

use axum::body::Bytes;
use axum::extract::{Path, Request, State};
use axum::http::{Method, StatusCode};
use axum::response::Response;
use serde_json::Value;

use crate::admin::form::{BufferedRequest, PostForm};
use crate::admin::require_session;
use crate::error::GatewayError;
use crate::http::request::request_id;
use crate::http::response::{no_store, relay_backend};
use crate::http::server::AppState;
use crate::upstream::{endpoint, forward_headers, BackendRequest, ForwardBody};

/// True for a non-empty run of ASCII digits.
pub fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Check the fields the backend cannot recover from.
///
/// `category_ids` must decode as a JSON array of integers and `author_id`
/// must be numeric when present. Missing title or content is only logged;
/// the backend owns that rule.
pub fn validate_post_form(form: &PostForm) -> Result<(), GatewayError> {
    if let Some(raw) = form.get("category_ids") {
        if serde_json::from_str::<Vec<i64>>(raw).is_err() {
            return Err(GatewayError::invalid(
                "category_ids must be a JSON array of integers",
            ));
        }
    }

    if let Some(author) = form.get("author_id") {
        if !is_numeric_id(author.trim()) {
            return Err(GatewayError::invalid("author_id must be numeric"));
        }
    }

    for field in ["title", "content"] {
        if form.get(field).is_none() {
            tracing::warn!(field, "Post form is missing a field");
        }
    }

    Ok(())
}

/// `POST /api/admin/createposts`
pub async fn create_post(State(state): State<AppState>, request: Request) -> Result<Response, GatewayError> {
    require_session(request.headers())?;

    let inbound = BufferedRequest::read(request, state.config.listener.max_body_bytes).await?;
    let form = inbound.form().await?;
    validate_post_form(&form)?;

    tracing::info!(
        request_id = %request_id(&inbound.headers),
        fields = form.fields.len(),
        files = form.files.len(),
        "Forwarding new post"
    );

    let url = endpoint(&state.backend_url(), "/api/admin/createposts");
    let backend_request = BackendRequest::new(Method::POST, url)
        .headers(forward_headers(&inbound.headers, ForwardBody::Inbound))
        .body(inbound.body);

    let response = state.call_backend(backend_request, &state.write_policy()).await?;
    relay_backend(response, Some(StatusCode::CREATED))
}

/// `PUT /api/admin/createposts`, target post taken from the `news_id` field.
pub async fn update_post(State(state): State<AppState>, request: Request) -> Result<Response, GatewayError> {
    require_session(request.headers())?;

    let inbound = BufferedRequest::read(request, state.config.listener.max_body_bytes).await?;
    let form = inbound.form().await?;

    let news_id = form
        .get("news_id")
        .map(str::trim)
        .ok_or_else(|| GatewayError::invalid("News ID is required"))?;
    if !is_numeric_id(news_id) {
        return Err(GatewayError::invalid("News ID must be numeric"));
    }
    validate_post_form(&form)?;

    tracing::info!(
        request_id = %request_id(&inbound.headers),
        news_id,
        files = form.files.len(),
        "Forwarding post update"
    );

    let url = endpoint(&state.backend_url(), &format!("/api/admin/createposts/{news_id}"));
    let backend_request = BackendRequest::new(Method::PUT, url)
        .headers(forward_headers(&inbound.headers, ForwardBody::Inbound))
        .body(inbound.body.clone());

    let response = state.call_backend(backend_request, &state.write_policy()).await?;
    relay_backend(response, Some(StatusCode::OK))
}

/// `news_id` from a JSON body, as a string or a number.
pub fn news_id_from_json(body: &Value) -> Result<String, GatewayError> {
    let id = match body.get("news_id") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Null) | None => return Err(GatewayError::invalid("News ID is required")),
        Some(_) => String::new(),
    };

    if id.is_empty() {
        return Err(GatewayError::invalid("News ID is required"));
    }
    if !is_numeric_id(&id) {
        return Err(GatewayError::invalid("News ID must be numeric"));
    }
    Ok(id)
}

/// `DELETE /api/admin/createposts` with `{"news_id": ...}`.
pub async fn delete_post(State(state): State<AppState>, request: Request) -> Result<Response, GatewayError> {
    require_session(request.headers())?;

    let inbound = BufferedRequest::read(request, state.config.listener.max_body_bytes).await?;
    let payload: Value = serde_json::from_slice(&inbound.body)
        .map_err(|e| GatewayError::invalid(format!("Invalid JSON body: {e}")))?;
    let news_id = news_id_from_json(&payload)?;

    tracing::info!(request_id = %request_id(&inbound.headers), news_id = %news_id, "Forwarding post deletion");

    let url = endpoint(&state.backend_url(), &format!("/api/admin/createposts/{news_id}"));
    let backend_request = BackendRequest::new(Method::DELETE, url)
        .headers(forward_headers(&inbound.headers, ForwardBody::Json))
        .body(inbound.body);

    let response = state.call_backend(backend_request, &state.write_policy()).await?;
    relay_backend(response, Some(StatusCode::OK))
}

/// `DELETE /api/admin/delete/{id}`.
///
/// The id is checked before the session. A JSON object body, if any, is
/// forwarded; anything else is dropped.
pub async fn delete_post_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Response, GatewayError> {
    if !is_numeric_id(&id) {
        return Err(GatewayError::invalid("Valid post ID is required"));
    }
    require_session(request.headers())?;

    let inbound = BufferedRequest::read(request, state.config.listener.max_body_bytes).await?;
    let url = endpoint(&state.backend_url(), &format!("/api/admin/delete/{id}"));
    let mut backend_request =
        BackendRequest::new(Method::DELETE, url).headers(forward_headers(&inbound.headers, ForwardBody::Json));
    if let Some(payload) = forwardable_json(&inbound.body) {
        backend_request = backend_request.body(payload);
    }

    tracing::info!(request_id = %request_id(&inbound.headers), id = %id, "Forwarding delete by id");

    let response = state.call_backend(backend_request, &state.write_policy()).await?;
    relay_backend(response, Some(StatusCode::OK)).map(no_store)
}

/// `body` if it is a non-empty JSON object.
fn forwardable_json(body: &Bytes) -> Option<Bytes> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Some(body.clone()),
        Ok(_) => None,
        Err(e) => {
            if !body.is_empty() {
                tracing::debug!(error = %e, "Ignoring non-JSON delete body");
            }
            None
        }
    }
}
