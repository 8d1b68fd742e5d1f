//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (origin negotiation, preflight short-circuit)
//!     → auth.rs (bearer token gate)
//!     → headers.rs (fresh outbound header map, credential removed)
//!     → Pass to upstream forwarder
//! ```
//!
//! # Design Decisions
//! - Fail closed: anything but an exact token match is rejected
//! - The shared secret never leaves the proxy (not upstream, not in logs)
//! - CORS denial is silent: the allow-origin header is simply omitted

pub mod auth;
pub mod cors;
pub mod headers;

pub use auth::{AuthError, Authenticator};
pub use cors::{CorsDecision, CorsPolicy};
