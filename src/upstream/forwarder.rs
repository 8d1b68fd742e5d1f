//! Upstream forwarding.
//!
//! # Responsibilities
//! - Build a fresh outbound request (copy-on-forward) from the inbound one
//! - Map the inbound path and query onto the target base URL
//! - Send it once, bounded by the configured timeout
//! - Relay status, headers and body as a stream, or classify the failure
//!
//! # Design Decisions
//! - No retries: every failure surfaces on the first attempt
//! - Failure details are logged by the caller, never returned to the client
//! - Dropping the future (caller went away) drops the upstream call with it

use std::time::Duration;

use axum::{
    body::Body,
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        HeaderValue, Request, Response, StatusCode, Uri,
    },
    response::IntoResponse,
};
use hyper::body::Incoming;
use thiserror::Error;

use crate::config::ProxyConfig;
use crate::http::response::{self, error_response, ErrorBody};
use crate::routing::PathRewriter;
use crate::security::headers::outbound_headers;
use crate::upstream::body::{self as inbound, BodyTooLarge, InboundBody};
use crate::upstream::client::{build_client, UpstreamClient};

/// Why a request could not be relayed.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("could not build upstream URI {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("connection to upstream failed: {0}")]
    Connect(#[source] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error("upstream exchange failed: {0}")]
    Protocol(#[source] hyper_util::client::legacy::Error),
}

impl ForwardError {
    fn from_client(e: hyper_util::client::legacy::Error) -> Self {
        if e.is_connect() {
            ForwardError::Connect(e)
        } else {
            ForwardError::Protocol(e)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<BodyTooLarge> for ForwardError {
    fn from(e: BodyTooLarge) -> Self {
        ForwardError::PayloadTooLarge { limit: e.limit }
    }
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response<Body> {
        match self {
            ForwardError::PayloadTooLarge { .. } => response::payload_too_large(),
            _ => error_response(
                StatusCode::BAD_GATEWAY,
                ErrorBody::with_message("Bad Gateway", "Failed to connect to target service"),
            ),
        }
    }
}

/// Sends authenticated requests to the single configured target.
#[derive(Clone)]
pub struct Forwarder {
    client: UpstreamClient,
    target: String,
    rewriter: PathRewriter,
    timeout: Duration,
    max_body_bytes: usize,
}

impl Forwarder {
    pub fn new(config: &ProxyConfig) -> Self {
        Self::with_client(config, build_client(&config.upstream))
    }

    pub fn with_client(config: &ProxyConfig, client: UpstreamClient) -> Self {
        Self {
            client,
            target: config.upstream.target_url.trim_end_matches('/').to_string(),
            rewriter: PathRewriter::new(&config.upstream.path_rewrites),
            timeout: config.upstream.timeout(),
            max_body_bytes: config.limits.max_body_bytes,
        }
    }

    /// Target base + rewritten path + original query.
    pub fn upstream_uri(&self, inbound: &Uri) -> Result<Uri, ForwardError> {
        let path = self.rewriter.rewrite(inbound.path());
        let uri = match inbound.query() {
            Some(query) => format!("{}{}?{}", self.target, path, query),
            None => format!("{}{}", self.target, path),
        };
        uri.parse::<Uri>().map_err(|e| ForwardError::InvalidUri {
            reason: e.to_string(),
            uri,
        })
    }

    /// Construct the outbound request. The inbound request is consumed; its
    /// header map is read, never edited.
    pub async fn build_outbound(&self, request: Request<Body>) -> Result<Request<Body>, ForwardError> {
        let (parts, body) = request.into_parts();
        let uri = self.upstream_uri(&parts.uri)?;
        let mut headers = outbound_headers(&parts.headers);

        let body = match inbound::classify(&parts.headers, body, self.max_body_bytes).await? {
            InboundBody::Structured(json) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                headers.insert(CONTENT_LENGTH, HeaderValue::from(json.len()));
                Body::from(json)
            }
            InboundBody::Malformed => {
                headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
                Body::empty()
            }
            InboundBody::Passthrough(body) => body,
        };

        let mut outbound = Request::new(body);
        *outbound.method_mut() = parts.method;
        *outbound.uri_mut() = uri;
        *outbound.headers_mut() = headers;
        Ok(outbound)
    }

    /// Forward once and stream the upstream response back.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response<Body>, ForwardError> {
        let outbound = self.build_outbound(request).await?;

        tracing::debug!(
            method = %outbound.method(),
            uri = %outbound.uri(),
            "Forwarding to upstream"
        );

        let response: Response<Incoming> =
            tokio::time::timeout(self.timeout, self.client.request(outbound))
                .await
                .map_err(|_| ForwardError::Timeout(self.timeout))?
                .map_err(ForwardError::from_client)?;

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}
