//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and the env parser handle syntax)
//! - Required fields present (target URL, bearer token)
//! - Value ranges (timeouts > 0, body limit > 0)
//! - Header values the CORS policy will emit are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("TARGET_URL is required")]
    MissingTargetUrl,

    #[error("target URL {url:?} is invalid: {reason}")]
    InvalidTargetUrl { url: String, reason: String },

    #[error("BEARER_TOKEN is required")]
    MissingBearerToken,

    #[error("listener host {0:?} is not an IP address")]
    InvalidHost(String),

    #[error("health path {0:?} must start with '/'")]
    InvalidHealthPath(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("path rewrite {from:?} -> {to:?}: both prefixes must start with '/'")]
    InvalidPathRewrite { from: String, to: String },

    #[error("cors.{0} is not a valid header value")]
    InvalidCorsHeader(&'static str),
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_target_url(&config.upstream.target_url, &mut errors);

    if config.auth.bearer_token.is_empty() {
        errors.push(ValidationError::MissingBearerToken);
    }

    if config.listener.socket_addr().is_err() {
        errors.push(ValidationError::InvalidHost(config.listener.host.clone()));
    }

    if !config.service.health_path.starts_with('/') {
        errors.push(ValidationError::InvalidHealthPath(
            config.service.health_path.clone(),
        ));
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("upstream.timeout_secs"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("upstream.connect_timeout_secs"));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("limits.max_body_bytes"));
    }

    for rewrite in &config.upstream.path_rewrites {
        if !rewrite.from.starts_with('/') || !rewrite.to.starts_with('/') {
            errors.push(ValidationError::InvalidPathRewrite {
                from: rewrite.from.clone(),
                to: rewrite.to.clone(),
            });
        }
    }

    if config.cors.enabled {
        if HeaderValue::from_str(&config.cors.allowed_methods).is_err() {
            errors.push(ValidationError::InvalidCorsHeader("allowed_methods"));
        }
        if HeaderValue::from_str(&config.cors.allowed_headers).is_err() {
            errors.push(ValidationError::InvalidCorsHeader("allowed_headers"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_target_url(raw: &str, errors: &mut Vec<ValidationError>) {
    if raw.trim().is_empty() {
        errors.push(ValidationError::MissingTargetUrl);
        return;
    }

    let invalid = |reason: &str| ValidationError::InvalidTargetUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    match Url::parse(raw) {
        Ok(url) => {
            if !matches!(url.scheme(), "http" | "https") {
                errors.push(invalid("scheme must be http or https"));
            }
            if url.host_str().is_none() {
                errors.push(invalid("missing host"));
            }
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(invalid("must not carry a query or fragment"));
            }
        }
        Err(e) => errors.push(invalid(&e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{Credential, PathRewriteConfig};

    fn valid() -> ProxyConfig {
        let mut config = ProxyConfig::default();
        config.upstream.target_url = "http://127.0.0.1:8000".into();
        config.auth.bearer_token = Credential::new("token");
        config
    }

    #[test]
    fn accepts_minimal_config() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn reports_every_missing_required_field() {
        let errors = validate_config(&ProxyConfig::default()).unwrap_err();
        assert!(errors.contains(&ValidationError::MissingTargetUrl));
        assert!(errors.contains(&ValidationError::MissingBearerToken));
    }

    #[test]
    fn rejects_bad_target_urls() {
        for url in ["not a url", "ftp://host", "http://host/?a=b", "http://host/#frag"] {
            let mut config = valid();
            config.upstream.target_url = url.into();
            let errors = validate_config(&config).unwrap_err();
            assert!(
                matches!(errors[0], ValidationError::InvalidTargetUrl { .. }),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn accepts_https_target_with_base_path() {
        let mut config = valid();
        config.upstream.target_url = "https://inference.internal/api".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_relative_health_path_and_zero_limits() {
        let mut config = valid();
        config.service.health_path = "health".into();
        config.upstream.timeout_secs = 0;
        config.limits.max_body_bytes = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroValue("upstream.timeout_secs")));
    }

    #[test]
    fn rejects_relative_rewrite_prefixes() {
        let mut config = valid();
        config.upstream.path_rewrites.push(PathRewriteConfig {
            from: "api".into(),
            to: "/v1".into(),
        });
        assert!(matches!(
            validate_config(&config).unwrap_err()[0],
            ValidationError::InvalidPathRewrite { .. }
        ));
    }

    #[test]
    fn cors_header_values_checked_only_when_enabled() {
        let mut config = valid();
        config.cors.allowed_methods = "GET\nPOST".into();
        assert!(validate_config(&config).is_ok());

        config.cors.enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidCorsHeader("allowed_methods")]
        );
    }
}
