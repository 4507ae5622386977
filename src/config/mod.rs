//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable, shared via Arc)
//!
//! Per request:
//!     env.rs EnvProvider::snapshot()
//!     → RuntimeEnv (fresh read of the recognized variables)
//!     → resolve_backend_url / production-mode cookie attributes
//! ```
//!
//! # Design Decisions
//! - File config is immutable once loaded
//! - All fields have defaults to allow running with no file at all
//! - Environment variables are resolved per request, never cached

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{resolve_backend_url, EnvProvider, RuntimeEnv};
pub use loader::{load_config, ConfigError};
pub use schema::{
    BackendConfig, CorsConfig, GatewayConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    RetryConfig, SecurityConfig, SessionConfig, TimeoutConfig,
};
