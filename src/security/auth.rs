//! Bearer token authentication.
//!
//! A single static shared secret gates every forwarded request. The secret
//! authenticates calls to the proxy only; the header carrying it is removed
//! before anything is sent upstream (see `security::headers`).

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::config::{AuthConfig, Credential};
use crate::http::response::{error_response, ErrorBody};

/// Literal scheme prefix, matched case-sensitively.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Why a request was refused.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header, or one without the `Bearer ` scheme.
    #[error("missing bearer credential")]
    MissingCredential,

    /// Well-formed bearer header carrying the wrong token.
    #[error("invalid bearer credential")]
    InvalidCredential,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential => StatusCode::UNAUTHORIZED,
            AuthError::InvalidCredential => StatusCode::FORBIDDEN,
        }
    }

    /// Client-facing summary placed in the `error` field.
    pub fn summary(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "Unauthorized: Bearer token required",
            AuthError::InvalidCredential => "Forbidden: Invalid token",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        error_response(self.status(), ErrorBody::new(self.summary()))
    }
}

/// Stateless predicate over the inbound `Authorization` header.
#[derive(Debug, Clone)]
pub struct Authenticator {
    credential: Credential,
}

impl Authenticator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            credential: config.bearer_token.clone(),
        }
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix(BEARER_PREFIX))
            .ok_or(AuthError::MissingCredential)?;

        if self.credential.matches(token) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredential)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn authenticator() -> Authenticator {
        Authenticator::new(&AuthConfig {
            bearer_token: Credential::new("s3cret"),
        })
    }

    fn headers(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn accepts_matching_token() {
        assert_eq!(authenticator().authenticate(&headers("Bearer s3cret")), Ok(()));
    }

    #[test]
    fn missing_header_is_401() {
        let err = authenticator().authenticate(&HeaderMap::new()).unwrap_err();
        assert_eq!(err, AuthError::MissingCredential);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn scheme_prefix_is_case_sensitive() {
        for value in ["bearer s3cret", "BEARER s3cret", "Basic czNjcmV0", "Bearers3cret", "s3cret"] {
            assert_eq!(
                authenticator().authenticate(&headers(value)),
                Err(AuthError::MissingCredential),
                "{value}"
            );
        }
    }

    #[test]
    fn wrong_token_is_403() {
        for value in ["Bearer wrong", "Bearer ", "Bearer  s3cret", "Bearer s3cret "] {
            let err = authenticator().authenticate(&headers(value)).unwrap_err();
            assert_eq!(err, AuthError::InvalidCredential, "{value}");
            assert_eq!(err.status(), StatusCode::FORBIDDEN);
        }
    }

    #[test]
    fn non_ascii_header_is_treated_as_missing() {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        );
        assert_eq!(
            authenticator().authenticate(&map),
            Err(AuthError::MissingCredential)
        );
    }

    #[test]
    fn error_messages_never_mention_the_token() {
        for err in [AuthError::MissingCredential, AuthError::InvalidCredential] {
            assert!(!err.to_string().contains("s3cret"));
        }
    }
}
