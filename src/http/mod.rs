//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, listener)
//!     → request.rs (signed path, request ID)
//!     → proxy pipeline
//!     → response.rs (error envelope when the pipeline fails)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{SignedRequest, X_REQUEST_ID};
pub use response::{ErrorEnvelope, ProxyError};
pub use server::{AppState, HttpServer};
