//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber once at startup
//! - Select text or JSON output from config
//!
//! # Design Decisions
//! - JSON format for production, text format for development
//! - `RUST_LOG` overrides `observability.log_level` when set

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

use crate::config::{LogFormat, ObservabilityConfig, ProxyConfig};

/// Filter used when `RUST_LOG` is absent.
pub fn default_directives(config: &ObservabilityConfig) -> String {
    format!(
        "secure_api_proxy={level},tower_http={level},{level}",
        level = config.log_level
    )
}

/// Install the global subscriber. Fails if one is already set.
pub fn init(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
    }
}

/// One summary line at startup. The credential is not a field.
pub fn log_startup(config: &ProxyConfig) {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        service = %config.service.name,
        target = %config.upstream.target_url,
        timeout_secs = config.upstream.timeout_secs,
        path_rewrites = config.upstream.path_rewrites.len(),
        cors_enabled = config.cors.enabled,
        "Configuration loaded"
    );
}
