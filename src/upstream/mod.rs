//! Upstream link API subsystem.
//!
//! # Data Flow
//! ```text
//! file path
//!     → resolver.rs (POST {address}/api/fs/link)
//!     → types.rs (UpstreamEnvelope → ResolvedLink)
//!     → handed to the forwarder
//! ```

pub mod resolver;
pub mod types;

pub use resolver::{normalize_url, LinkResolver, RESOLVER_USER_AGENT};
pub use types::{ResolveError, ResolveResult, ResolvedLink, UpstreamEnvelope};
