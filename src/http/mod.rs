//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → pipeline.rs (health → info → CORS → auth → forward)
//!     → response.rs (locally generated JSON bodies)
//!     → Send to client
//! ```

pub mod pipeline;
pub mod response;
pub mod server;

pub use pipeline::{RequestPipeline, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
