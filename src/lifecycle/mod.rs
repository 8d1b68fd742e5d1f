//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → every subscribed server stops accepting → drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Startup is strictly ordered in `main`: config, logging, bind, serve
//! - In-flight requests finish before the server future resolves

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
