//! Admin category listing.

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::Response;

use crate::error::GatewayError;
use crate::http::response::relay_backend;
use crate::http::server::AppState;
use crate::upstream::{endpoint, forward_headers, BackendRequest, ForwardBody};

/// `GET /api/admin/categories`. A read, so retried on 5xx and transport errors.
pub async fn list_categories(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, GatewayError> {
    let url = endpoint(&state.backend_url(), "/api/admin/categories");
    let request = BackendRequest::new(Method::GET, url).headers(forward_headers(&headers, ForwardBody::Json));

    let response = state.call_backend(request, &state.read_policy()).await?;
    relay_backend(response, Some(StatusCode::OK))
}
