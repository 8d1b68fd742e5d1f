//! Configuration loading: defaults, then an optional TOML file, then
//! environment variables.

use std::env::VarError;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::config::env::ReadEnv;
use crate::config::schema::{Credential, LogFormat, PathRewriteConfig, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("environment variable {key}={value:?} is invalid: {reason}")]
    Env {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid configuration: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, apply environment overrides and validate.
pub fn load_config<E: ReadEnv>(path: Option<&Path>, env: &E) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => ProxyConfig::default(),
    };

    apply_env(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML config file without validating it.
pub fn read_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Overlay environment variables onto `config`.
pub fn apply_env<E: ReadEnv>(config: &mut ProxyConfig, env: &E) -> Result<(), ConfigError> {
    if let Some(v) = lookup(env, "TARGET_URL") {
        config.upstream.target_url = v;
    }
    if let Some(v) = lookup(env, "BEARER_TOKEN") {
        config.auth.bearer_token = Credential::new(v);
    }
    if let Some(v) = lookup(env, "SERVICE_NAME") {
        config.service.name = v;
    }
    if let Some(v) = lookup(env, "HEALTH_PATH") {
        config.service.health_path = v;
    }
    if let Some(v) = parsed(env, "SERVICE_INFO_ENABLED", parse_bool)? {
        config.service.info_enabled = v;
    }
    // `HOST` is often the machine's hostname, so the bind address has its own key.
    if let Some(v) = lookup(env, "LISTEN_HOST") {
        config.listener.host = v;
    }
    if let Some(v) = parsed(env, "PORT", from_str::<u16>)? {
        config.listener.port = v;
    }
    if let Some(v) = parsed(env, "UPSTREAM_TIMEOUT_SECS", from_str::<u64>)? {
        config.upstream.timeout_secs = v;
    }
    if let Some(v) = parsed(env, "UPSTREAM_CONNECT_TIMEOUT_SECS", from_str::<u64>)? {
        config.upstream.connect_timeout_secs = v;
    }
    if let Some(v) = parsed(env, "PATH_REWRITES", parse_rewrites)? {
        config.upstream.path_rewrites = v;
    }
    if let Some(v) = parsed(env, "MAX_BODY_BYTES", from_str::<usize>)? {
        config.limits.max_body_bytes = v;
    }
    if let Some(v) = parsed(env, "CORS_ENABLED", parse_bool)? {
        config.cors.enabled = v;
    }
    if let Some(v) = lookup(env, "CORS_ALLOWED_ORIGINS") {
        config.cors.allowed_origins = split_list(&v);
    }
    if let Some(v) = lookup(env, "CORS_ALLOWED_METHODS") {
        config.cors.allowed_methods = v;
    }
    if let Some(v) = lookup(env, "CORS_ALLOWED_HEADERS") {
        config.cors.allowed_headers = v;
    }
    if let Some(v) = parsed(env, "CORS_ALLOW_CREDENTIALS", parse_bool)? {
        config.cors.allow_credentials = v;
    }
    if let Some(v) = parsed(env, "CORS_MAX_AGE_SECS", from_str::<u64>)? {
        config.cors.max_age_secs = Some(v);
    }
    if let Some(v) = lookup(env, "LOG_LEVEL") {
        config.observability.log_level = v;
    }
    if let Some(v) = parsed(env, "LOG_FORMAT", parse_log_format)? {
        config.observability.log_format = v;
    }

    Ok(())
}

/// Present and non-empty; an empty variable counts as unset.
fn lookup<E: ReadEnv>(env: &E, key: &str) -> Option<String> {
    match env.var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        Ok(_) | Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(_)) => None,
    }
}

fn parsed<E, T, F>(env: &E, key: &'static str, parse: F) -> Result<Option<T>, ConfigError>
where
    E: ReadEnv,
    F: FnOnce(&str) -> Result<T, String>,
{
    let Some(value) = lookup(env, key) else {
        return Ok(None);
    };
    parse(value.trim())
        .map(Some)
        .map_err(|reason| ConfigError::Env { key, value, reason })
}

fn from_str<T>(value: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| e.to_string())
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected a boolean (true/false)".to_string()),
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    match value.to_ascii_lowercase().as_str() {
        "text" | "pretty" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        _ => Err("expected 'text' or 'json'".to_string()),
    }
}

/// `"/a=/b, /c=/d"` into ordered prefix mappings.
fn parse_rewrites(value: &str) -> Result<Vec<PathRewriteConfig>, String> {
    split_list(value)
        .into_iter()
        .map(|pair| match pair.split_once('=') {
            Some((from, to)) => Ok(PathRewriteConfig {
                from: from.trim().to_string(),
                to: to.trim().to_string(),
            }),
            None => Err(format!("expected from=to, got {pair:?}")),
        })
        .collect()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::InMemoryEnv;
    use std::io::Write;

    fn required() -> InMemoryEnv {
        InMemoryEnv::new()
            .with("TARGET_URL", "http://127.0.0.1:8000")
            .with("BEARER_TOKEN", "secret")
    }

    #[test]
    fn loads_from_env_only() {
        let config = load_config(None, &required()).unwrap();
        assert_eq!(config.upstream.target_url, "http://127.0.0.1:8000");
        assert!(config.auth.bearer_token.matches("secret"));
        assert_eq!(config.listener.port, 3000);
        assert_eq!(config.service.name, "secure-api-proxy");
    }

    #[test]
    fn missing_required_values_fail() {
        let err = load_config(None, &InMemoryEnv::new()).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.contains(&ValidationError::MissingTargetUrl));
                assert!(errors.contains(&ValidationError::MissingBearerToken));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_variable_counts_as_unset() {
        let env = required().with("BEARER_TOKEN", "  ");
        assert!(matches!(
            load_config(None, &env),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn applies_cors_and_listener_overrides() {
        let env = required()
            .with("PORT", "8080")
            .with("SERVICE_NAME", "llm-gateway")
            .with("CORS_ENABLED", "true")
            .with("CORS_ALLOWED_ORIGINS", "https://a.test, https://b.test,")
            .with("CORS_ALLOW_CREDENTIALS", "yes")
            .with("CORS_MAX_AGE_SECS", "600")
            .with("LOG_FORMAT", "json");

        let config = load_config(None, &env).unwrap();
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.service.name, "llm-gateway");
        assert!(config.cors.enabled);
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.test".to_string(), "https://b.test".to_string()]
        );
        assert!(config.cors.allow_credentials);
        assert_eq!(config.cors.max_age_secs, Some(600));
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn bind_host_ignores_machine_hostname() {
        let env = required().with("HOST", "build-runner-42");
        let config = load_config(None, &env).unwrap();
        assert_eq!(config.listener.host, "0.0.0.0");

        let env = required()
            .with("HOST", "build-runner-42")
            .with("LISTEN_HOST", "127.0.0.1");
        let config = load_config(None, &env).unwrap();
        assert_eq!(config.listener.host, "127.0.0.1");
    }

    #[test]
    fn malformed_port_is_reported_with_key() {
        let env = required().with("PORT", "eighty");
        match load_config(None, &env).unwrap_err() {
            ConfigError::Env { key, value, .. } => {
                assert_eq!(key, "PORT");
                assert_eq!(value, "eighty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parses_path_rewrites() {
        let env = required().with("PATH_REWRITES", "/api=/v1, /legacy=/");
        let config = load_config(None, &env).unwrap();
        assert_eq!(
            config.upstream.path_rewrites,
            vec![
                PathRewriteConfig { from: "/api".into(), to: "/v1".into() },
                PathRewriteConfig { from: "/legacy".into(), to: "/".into() },
            ]
        );

        let env = required().with("PATH_REWRITES", "/api");
        assert!(matches!(
            load_config(None, &env),
            Err(ConfigError::Env { key: "PATH_REWRITES", .. })
        ));
    }

    #[test]
    fn env_overrides_file() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("secure-api-proxy-{}.toml", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
            [listener]
            port = 4000

            [upstream]
            target_url = "http://file-target:9000"
            timeout_secs = 30

            [auth]
            bearer_token = "from-file"
            "#
        )
        .unwrap();

        let env = InMemoryEnv::new().with("BEARER_TOKEN", "from-env");
        let config = load_config(Some(path.as_path()), &env).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.listener.port, 4000);
        assert_eq!(config.upstream.target_url, "http://file-target:9000");
        assert_eq!(config.upstream.timeout_secs, 30);
        assert!(config.auth.bearer_token.matches("from-env"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(
            Some(Path::new("/definitely/not/here.toml")),
            &required(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
