//! Locally generated responses.
//!
//! Every response the proxy produces itself (as opposed to relaying the
//! upstream's) is built here, so the client-facing JSON shapes live in one
//! place.

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// `{"error": ..., "message": ...}` body used for every local failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl ErrorBody {
    pub fn new(error: &'static str) -> Self {
        Self {
            error,
            message: None,
        }
    }

    pub fn with_message(error: &'static str, message: &'static str) -> Self {
        Self {
            error,
            message: Some(message),
        }
    }
}

/// Build a JSON error response.
pub fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}

/// Payload of the health endpoint.
#[derive(Debug, Serialize)]
pub struct HealthStatus<'a> {
    pub status: &'static str,
    pub service: &'a str,
}

pub fn health(service: &str) -> Response {
    Json(HealthStatus {
        status: "ok",
        service,
    })
    .into_response()
}

/// Payload of `GET /` when service info is enabled.
#[derive(Debug, Serialize)]
pub struct ServiceInfo<'a> {
    pub service: &'a str,
    pub version: &'static str,
    pub health: &'a str,
}

pub fn service_info(service: &str, health_path: &str) -> Response {
    Json(ServiceInfo {
        service,
        version: env!("CARGO_PKG_VERSION"),
        health: health_path,
    })
    .into_response()
}

/// Empty-bodied success used to answer preflight requests.
pub fn no_content() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

pub fn payload_too_large() -> Response {
    error_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        ErrorBody::new("Payload Too Large"),
    )
}
