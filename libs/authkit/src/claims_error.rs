use thiserror::Error;

use crate::standard_claims::StandardClaim;

/// A decodable, correctly signed token whose claims fail policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsError {
    #[error("Invalid issuer: expected {expected}, got {actual}")]
    InvalidIssuer { expected: String, actual: String },

    #[error("Invalid audience: expected {expected}, got {actual:?}")]
    InvalidAudience {
        expected: String,
        actual: Vec<String>,
    },

    #[error("Token expired")]
    Expired,

    #[error("Token not yet valid")]
    NotYetValid,

    #[error("Token issued in the future")]
    IssuedInFuture,

    #[error("Missing required claim: {0}")]
    MissingClaim(StandardClaim),

    #[error("Malformed claims: {0}")]
    Malformed(String),
}

impl ClaimsError {
    /// The registered claim that failed validation, if a single one did.
    #[must_use]
    pub fn claim(&self) -> Option<StandardClaim> {
        match self {
            Self::InvalidIssuer { .. } => Some(StandardClaim::Iss),
            Self::InvalidAudience { .. } => Some(StandardClaim::Aud),
            Self::Expired => Some(StandardClaim::Exp),
            Self::NotYetValid => Some(StandardClaim::Nbf),
            Self::IssuedInFuture => Some(StandardClaim::Iat),
            Self::MissingClaim(claim) => Some(*claim),
            Self::Malformed(_) => None,
        }
    }
}
