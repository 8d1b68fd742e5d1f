//! Outbound header sanitization.
//!
//! # Responsibilities
//! - Build a fresh header map for the upstream request (the inbound map is
//!   never mutated)
//! - Drop the caller's `Authorization` header unconditionally
//! - Drop `Host` (the client sets it from the target) and hop-by-hop headers
//!
//! Everything else is forwarded unmodified.

use axum::http::{
    header::{self, HeaderName},
    HeaderMap,
};

/// Connection-scoped headers that must not cross a proxy hop.
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Non-standard hop-by-hop headers still sent by some clients.
const LEGACY_HOP_BY_HOP: &[&str] = &["keep-alive", "proxy-connection"];

fn is_stripped(name: &HeaderName) -> bool {
    name == header::AUTHORIZATION
        || name == header::HOST
        || HOP_BY_HOP_HEADERS.contains(name)
        || LEGACY_HOP_BY_HOP.iter().any(|h| name.as_str() == *h)
}

/// Copy `incoming` into a new map suitable for the upstream request.
pub fn outbound_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(incoming.len());
    for (name, value) in incoming {
        if !is_stripped(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}
