//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (reject oversized bodies with 413)
//!     → cors.rs (admin routes: answer or decorate cross-origin calls)
//!     → handler
//! Outgoing response:
//!     → headers.rs (static hardening headers)
//! ```

pub mod cors;
pub mod headers;
pub mod limits;

pub use cors::{cors_middleware, preflight, CorsPolicy};
