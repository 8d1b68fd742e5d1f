//! Routing subsystem.
//!
//! There is exactly one upstream target, so "routing" reduces to mapping the
//! inbound path onto the target's path namespace.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     PathRewriteConfig[]
//!     → Normalize trailing slashes
//!     → Freeze as immutable PathRewriter
//!
//! Per request:
//!     inbound path → rewrite.rs → upstream path
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always rewrites the same way

pub mod rewrite;

pub use rewrite::PathRewriter;
