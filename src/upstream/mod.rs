//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! Authenticated inbound request
//!     → body.rs (JSON re-serialization / passthrough)
//!     → forwarder.rs (fresh outbound request, URI mapping, single send)
//!     → client.rs (pooled HTTP/HTTPS connection to the target)
//!     → upstream response streamed back, or ForwardError → 502
//! ```

pub mod body;
pub mod client;
pub mod forwarder;

pub use client::{build_client, UpstreamClient};
pub use forwarder::{ForwardError, Forwarder};
