use std::time::Duration;

use thiserror::Error;

use crate::claims_error::ClaimsError;

/// Errors produced while authenticating a bearer token.
///
/// Variants fall into two groups: the token itself cannot be trusted
/// ([`AuthError::is_credential_error`]), or the key service could not be
/// reached ([`AuthError::is_infrastructure`]). Hosts usually map the first
/// group to `401` and the second to `503`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token not found")]
    TokenNotPresent,

    #[error("malformed token: {0}")]
    Parse(String),

    #[error("no headers in the token")]
    MissingHeader,

    #[error("invalid algorithm: expected {expected}, got {actual}")]
    AlgorithmMismatch { expected: String, actual: String },

    #[error("JWK not found: {kid}")]
    KeyNotFound { kid: String },

    #[error("failed to fetch JWK set: {0}")]
    Fetch(#[from] FetchError),

    #[error("unusable verification key: {0}")]
    InvalidKey(String),

    #[error("invalid token signature")]
    Signature,

    #[error(transparent)]
    Claims(#[from] ClaimsError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AuthError {
    /// True when the failure comes from the remote key service rather than
    /// from the presented token.
    #[must_use]
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }

    /// True when the presented token is absent or untrustworthy.
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        !self.is_infrastructure() && !matches!(self, Self::InvalidConfig(_))
    }
}

/// Why a JWK Set download failed. The key cache is untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("remote JWK Set is not a JSON object (content type {0:?})")]
    ContentType(String),

    #[error("invalid JWK Set body: {0}")]
    Body(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,
}
