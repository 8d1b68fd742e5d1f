//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (loader.rs)
//!     → environment overrides (loader.rs via env.rs)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → passed by reference into every component constructor
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields except the target URL and bearer token have defaults
//! - Validation separates syntactic (serde, env parsing) from semantic checks
//! - A config error aborts startup before any socket is bound

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{InMemoryEnv, ReadEnv, SystemEnv};
pub use loader::{load_config, ConfigError};
pub use schema::{
    AuthConfig, CorsConfig, Credential, LimitsConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, PathRewriteConfig, ProxyConfig, ServiceConfig, UpstreamConfig,
};
