//! Inbound body limits.
//!
//! Post uploads carry images, so the limit is set well above axum's 2 MiB
//! extractor default. Handlers read bodies through the limited extractors and
//! answer an oversized body with a structured 413 from inside the admin CORS
//! layer.

use axum::extract::DefaultBodyLimit;
use axum::Router;

pub fn with_body_limit<S>(router: Router<S>, max_bytes: usize) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(DefaultBodyLimit::max(max_bytes))
}
