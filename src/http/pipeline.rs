//! Per-request decision pipeline.
//!
//! # Stages
//! ```text
//! health path?           → 200 health body
//! GET / (info enabled)?  → 200 service info
//! CORS evaluation        → OPTIONS answered with 204
//! authentication         → 401 / 403
//! forwarding             → upstream response, 413 or 502
//! ```
//!
//! CORS headers decided in stage three are merged into every response the
//! later stages produce. Nothing is retained between requests.

use axum::{
    body::Body,
    http::{Method, Request},
    response::{IntoResponse, Response},
};

use crate::config::ProxyConfig;
use crate::http::response;
use crate::http::server::ServerError;
use crate::security::{Authenticator, CorsPolicy};
use crate::upstream::{ForwardError, Forwarder, UpstreamClient};

/// Header carrying the id assigned by the request-id layer.
pub const X_REQUEST_ID: &str = "x-request-id";

pub struct RequestPipeline {
    service_name: String,
    health_path: String,
    info_enabled: bool,
    cors: CorsPolicy,
    auth: Authenticator,
    forwarder: Forwarder,
}

impl RequestPipeline {
    pub fn new(config: &ProxyConfig) -> Result<Self, ServerError> {
        Self::with_forwarder(config, Forwarder::new(config))
    }

    /// Use a caller-supplied upstream client instead of building one.
    pub fn with_client(config: &ProxyConfig, client: UpstreamClient) -> Result<Self, ServerError> {
        Self::with_forwarder(config, Forwarder::with_client(config, client))
    }

    fn with_forwarder(config: &ProxyConfig, forwarder: Forwarder) -> Result<Self, ServerError> {
        Ok(Self {
            service_name: config.service.name.clone(),
            health_path: config.service.health_path.clone(),
            info_enabled: config.service.info_enabled,
            cors: CorsPolicy::new(&config.cors)?,
            auth: Authenticator::new(&config.auth),
            forwarder,
        })
    }

    pub async fn handle(&self, request: Request<Body>) -> Response {
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        if path == self.health_path {
            tracing::debug!(request_id = %request_id, "Health check");
            return response::health(&self.service_name);
        }

        if self.info_enabled && method == Method::GET && path == "/" {
            tracing::debug!(request_id = %request_id, "Service info");
            return response::service_info(&self.service_name, &self.health_path);
        }

        let cors = self.cors.evaluate(&method, request.headers());
        if cors.short_circuit {
            tracing::debug!(request_id = %request_id, path = %path, "Answering preflight");
            let mut preflight = response::no_content();
            cors.apply(preflight.headers_mut());
            return preflight;
        }

        let mut response = match self.auth.authenticate(request.headers()) {
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    reason = %e,
                    "Rejected request"
                );
                e.into_response()
            }
            Ok(()) => match self.forwarder.forward(request).await {
                Ok(upstream) => {
                    tracing::debug!(
                        request_id = %request_id,
                        status = upstream.status().as_u16(),
                        "Relaying upstream response"
                    );
                    upstream
                }
                Err(e @ ForwardError::PayloadTooLarge { .. }) => {
                    tracing::warn!(request_id = %request_id, path = %path, error = %e, "Request body rejected");
                    e.into_response()
                }
                Err(e) => {
                    tracing::error!(
                        request_id = %request_id,
                        method = %method,
                        path = %path,
                        error = %e,
                        "Upstream request failed"
                    );
                    e.into_response()
                }
            },
        };

        cors.apply(response.headers_mut());
        response
    }
}
