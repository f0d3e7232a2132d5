//! Download proxy subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → pipeline.rs (signature check, self-redirect loop)
//!     → upstream resolver (path → ResolvedLink)
//!     → forward.rs (request link, follow external redirects)
//!         → headers.rs (outbound header overlay)
//!     → sanitize.rs (strip cookies/CORS, add our CORS)
//!     → stream.rs (stream body, log outcome)
//!     → client
//! ```

pub mod forward;
pub mod headers;
pub mod pipeline;
pub mod sanitize;
pub mod stream;

pub use forward::{ForwardError, Forwarded, Forwarder};
pub use pipeline::{download_handler, MAX_SELF_REDIRECTS};
