//! Cross-origin resource sharing.
//!
//! The policy is compiled once from [`CorsConfig`] and evaluated per request
//! into a [`CorsDecision`], which the pipeline either answers directly
//! (preflight) or merges into whatever response the later stages produce.

use axum::http::{
    header::{
        ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
        ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ORIGIN,
        VARY,
    },
    header::InvalidHeaderValue,
    HeaderMap, HeaderValue, Method,
};

use crate::config::CorsConfig;

/// Marker that allows every origin.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone)]
enum AllowedOrigins {
    /// Echo the request origin, or `*` when there is none.
    Any,
    /// Exact string membership.
    List(Vec<String>),
}

/// Compiled CORS policy.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    enabled: bool,
    origins: AllowedOrigins,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    allow_credentials: bool,
    max_age: Option<HeaderValue>,
}

/// Per-request outcome of CORS evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsDecision {
    pub allow_origin: Option<HeaderValue>,
    pub allow_methods: Option<HeaderValue>,
    pub allow_headers: Option<HeaderValue>,
    pub allow_credentials: bool,
    pub max_age: Option<HeaderValue>,
    /// The allowed origin depends on the request's `Origin` header.
    pub vary_origin: bool,
    /// Preflight: answer now, skip authentication and forwarding.
    pub short_circuit: bool,
}

impl CorsPolicy {
    pub fn new(config: &CorsConfig) -> Result<Self, InvalidHeaderValue> {
        let origins = if config.allowed_origins.is_empty()
            || config.allowed_origins.iter().any(|o| o == WILDCARD)
        {
            AllowedOrigins::Any
        } else {
            AllowedOrigins::List(config.allowed_origins.clone())
        };

        Ok(Self {
            enabled: config.enabled,
            origins,
            allow_methods: HeaderValue::from_str(&config.allowed_methods)?,
            allow_headers: HeaderValue::from_str(&config.allowed_headers)?,
            allow_credentials: config.allow_credentials,
            max_age: config.max_age_secs.map(HeaderValue::from),
        })
    }

    pub fn evaluate(&self, method: &Method, headers: &HeaderMap) -> CorsDecision {
        if !self.enabled {
            return CorsDecision::default();
        }

        let origin = headers.get(ORIGIN);
        let (allow_origin, vary_origin) = match (&self.origins, origin) {
            (AllowedOrigins::Any, Some(origin)) => (Some(origin.clone()), true),
            (AllowedOrigins::Any, None) => (Some(HeaderValue::from_static(WILDCARD)), false),
            (AllowedOrigins::List(list), Some(origin)) => {
                let allowed = origin
                    .to_str()
                    .map(|o| list.iter().any(|allowed| allowed == o))
                    .unwrap_or(false);
                (allowed.then(|| origin.clone()), true)
            }
            (AllowedOrigins::List(_), None) => (None, true),
        };

        CorsDecision {
            allow_origin,
            allow_methods: Some(self.allow_methods.clone()),
            allow_headers: Some(self.allow_headers.clone()),
            allow_credentials: self.allow_credentials,
            max_age: self.max_age.clone(),
            vary_origin,
            short_circuit: method == Method::OPTIONS,
        }
    }
}

impl CorsDecision {
    /// Add the decided headers to a response.
    ///
    /// Headers already present are kept, so an upstream's own CORS headers
    /// reach the caller unchanged.
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Some(origin) = &self.allow_origin {
            headers
                .entry(ACCESS_CONTROL_ALLOW_ORIGIN)
                .or_insert_with(|| origin.clone());
        }
        if let Some(methods) = &self.allow_methods {
            headers
                .entry(ACCESS_CONTROL_ALLOW_METHODS)
                .or_insert_with(|| methods.clone());
        }
        if let Some(allowed) = &self.allow_headers {
            headers
                .entry(ACCESS_CONTROL_ALLOW_HEADERS)
                .or_insert_with(|| allowed.clone());
        }
        if self.allow_credentials {
            headers
                .entry(ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .or_insert(HeaderValue::from_static("true"));
        }
        if let Some(max_age) = &self.max_age {
            headers
                .entry(ACCESS_CONTROL_MAX_AGE)
                .or_insert_with(|| max_age.clone());
        }
        if self.vary_origin {
            let already_varies = headers
                .get_all(VARY)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .flat_map(|v| v.split(','))
                .any(|v| v.trim().eq_ignore_ascii_case("origin") || v.trim() == "*");
            if !already_varies {
                headers.append(VARY, HeaderValue::from_static("Origin"));
            }
        }
    }
}
