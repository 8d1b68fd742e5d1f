//! Inbound body classification.
//!
//! `application/json` bodies are buffered, parsed and re-serialized so the
//! outbound `Content-Length` is exact. A body that claims to be JSON but does
//! not parse is forwarded as no body at all. Anything else, including `+json`
//! media types and content-encoded bodies, streams through untouched.

use axum::{
    body::{Body, Bytes},
    http::{
        header::{CONTENT_ENCODING, CONTENT_TYPE},
        HeaderMap,
    },
};
use http_body_util::{BodyExt, LengthLimitError, Limited};

/// How the inbound body will be forwarded.
#[derive(Debug)]
pub enum InboundBody {
    /// Parsed JSON, re-serialized.
    Structured(Bytes),
    /// Declared JSON that failed to parse or could not be read.
    Malformed,
    /// Any other content type, forwarded as a stream.
    Passthrough(Body),
}

/// The JSON body exceeded the configured buffer limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyTooLarge {
    pub limit: usize,
}

/// Exactly `application/json`, parameters ignored. Suffix types such as
/// `application/merge-patch+json` carry their own semantics and are not
/// rewritten.
pub fn is_json(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let media_type = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type == "application/json"
}

/// Any `Content-Encoding` other than `identity`.
pub fn is_encoded(headers: &HeaderMap) -> bool {
    headers.get_all(CONTENT_ENCODING).iter().any(|value| {
        value
            .to_str()
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .any(|coding| !coding.is_empty() && !coding.eq_ignore_ascii_case("identity"))
            })
            .unwrap_or(true)
    })
}

pub async fn classify(
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<InboundBody, BodyTooLarge> {
    if !is_json(headers) || is_encoded(headers) {
        return Ok(InboundBody::Passthrough(body));
    }

    let bytes = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(BodyTooLarge { limit });
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to read request body");
            return Ok(InboundBody::Malformed);
        }
    };

    let reserialized = serde_json::from_slice::<serde_json::Value>(&bytes)
        .and_then(|value| serde_json::to_vec(&value));
    match reserialized {
        Ok(json) => Ok(InboundBody::Structured(Bytes::from(json))),
        Err(e) => {
            tracing::debug!(error = %e, len = bytes.len(), "Discarding malformed JSON body");
            Ok(InboundBody::Malformed)
        }
    }
}
