//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID assigned and propagated)
//!     → admin / client handlers
//!     → response.rs (backend body decoded, status normalized)
//!     → cookies.rs (Set-Cookie relayed onto the reply)
//!     → Send to client
//! ```

pub mod cookies;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
