//! Admin proxy routes.
//!
//! Every route here carries the credentialed CORS policy, runs under the
//! request deadline and answers `OPTIONS` locally. Mutations require a session cookie, checked before
//! anything is sent to the backend.

pub mod auth;
pub mod categories;
pub mod form;
pub mod posts;

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::error::GatewayError;
use crate::http::server::AppState;
use crate::resilience::request_deadline;
use crate::security::{cors_middleware, preflight};

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/admin/createposts",
            post(posts::create_post)
                .put(posts::update_post)
                .delete(posts::delete_post)
                .options(preflight),
        )
        .route(
            "/api/admin/delete/{id}",
            delete(posts::delete_post_by_id).options(preflight),
        )
        .route(
            "/api/admin/categories",
            get(categories::list_categories).options(preflight),
        )
        .route("/api/admin/auth/login", post(auth::login).options(preflight))
        .route("/api/admin/auth/logout", post(auth::logout).options(preflight))
        .layer(middleware::from_fn_with_state(state.clone(), request_deadline))
        .layer(middleware::from_fn_with_state(state, cors_middleware))
}

/// Fails unless the request carries a non-empty `Cookie` header.
///
/// The cookie itself is opaque here; the backend decides whether it is valid.
pub fn require_session(headers: &HeaderMap) -> Result<(), GatewayError> {
    match headers.get(COOKIE) {
        Some(cookie) if !cookie.is_empty() => Ok(()),
        _ => Err(GatewayError::MissingSession),
    }
}
