//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems emit `tracing` events
//!     → logging.rs (EnvFilter + text or JSON formatter on stdout)
//! tower-http TraceLayer
//!     → one span per request, correlated by x-request-id
//! ```
//!
//! # Design Decisions
//! - The bearer credential is never a field on any event
//! - `RUST_LOG` wins over the configured level

pub mod logging;

pub use logging::{init, log_startup};
