//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive `Deserialize` so they can be read from a TOML file;
//! environment overrides are applied on top by the loader.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;
use subtle::ConstantTimeEq;

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// The single upstream target.
    pub upstream: UpstreamConfig,

    /// Shared-secret authentication.
    pub auth: AuthConfig,

    /// Service identity and the unauthenticated endpoints.
    pub service: ServiceConfig,

    /// Cross-origin resource sharing policy.
    pub cors: CorsConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port to bind.
    pub port: u16,
}

impl ListenerConfig {
    /// Resolve the configured host and port into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Upstream target configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the target service (e.g., "http://127.0.0.1:8000").
    pub target_url: String,

    /// Upper bound on waiting for the upstream response head, in seconds.
    pub timeout_secs: u64,

    /// TCP connect timeout, in seconds.
    pub connect_timeout_secs: u64,

    /// Ordered path prefix rewrites applied before forwarding.
    pub path_rewrites: Vec<PathRewriteConfig>,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            timeout_secs: 300,
            connect_timeout_secs: 10,
            path_rewrites: Vec::new(),
        }
    }
}

/// A single prefix mapping: paths starting with `from` have it replaced by `to`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PathRewriteConfig {
    pub from: String,
    pub to: String,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret callers present as `Authorization: Bearer <token>`.
    pub bearer_token: Credential,
}

/// The static shared secret.
///
/// Never printed: `Debug` and `Display` both render a redacted marker.
#[derive(Clone, Deserialize, Default)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact comparison against a presented token, in constant time.
    pub fn matches(&self, presented: &str) -> bool {
        self.0.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Service identity and unauthenticated endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Display name reported by the health and info endpoints.
    pub name: String,

    /// Path answered locally for infrastructure probes.
    pub health_path: String,

    /// Answer `GET /` with static service metadata instead of forwarding it.
    pub info_enabled: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "secure-api-proxy".to_string(),
            health_path: "/proxy/health".to_string(),
            info_enabled: false,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS handling.
    pub enabled: bool,

    /// Allowed origins. Empty, or containing "*", allows every origin.
    pub allowed_origins: Vec<String>,

    /// Value of `Access-Control-Allow-Methods`.
    pub allowed_methods: String,

    /// Value of `Access-Control-Allow-Headers`.
    pub allowed_headers: String,

    /// Emit `Access-Control-Allow-Credentials: true`.
    pub allow_credentials: bool,

    /// Value of `Access-Control-Max-Age`, if any.
    pub max_age_secs: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            allowed_methods: "GET, POST, PUT, DELETE, PATCH, OPTIONS".to_string(),
            allowed_headers: "Content-Type, Authorization".to_string(),
            allow_credentials: false,
            max_age_secs: None,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest JSON body buffered for re-serialization, in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Human-readable or JSON lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}
