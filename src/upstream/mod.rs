//! Backend collaborator access.
//!
//! # Data Flow
//! ```text
//! handler
//!     → request.rs (forwarded header subset, endpoint URL)
//!     → client.rs (deadline + bounded retry)
//!     → transport.rs (one HTTP attempt; reqwest or a test double)
//! ```

pub mod client;
pub mod request;
pub mod transport;

pub use client::BackendClient;
pub use request::{endpoint, forward_headers, segment_endpoint, ForwardBody};
pub use transport::{BackendRequest, BackendResponse, ReqwestTransport, Transport, TransportError};
