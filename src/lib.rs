//! Newsroom API gateway library.
//!
//! Proxies the admin and public site routes of the news platform to the
//! backend REST API: session and CSRF headers forwarded verbatim, cookies
//! relayed, backend failures normalized into structured JSON.

pub mod admin;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;
pub mod upstream;

#[cfg(test)]
pub(crate) mod testing;

pub use config::schema::GatewayConfig;
pub use error::GatewayError;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
