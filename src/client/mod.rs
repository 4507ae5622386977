//! Public (client site) proxy routes.
//!
//! Read-only and cookie-optional; no CORS policy since the site calls them
//! same-origin.

pub mod categories;
pub mod taxonomy;

use axum::{middleware, routing::get, Router};

use crate::http::server::AppState;
use crate::resilience::request_deadline;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/client/categories", get(categories::list_groups))
        .route("/api/client/categories/{slug}", get(categories::get_group))
        .layer(middleware::from_fn_with_state(state, request_deadline))
}
