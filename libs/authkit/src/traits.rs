use crate::{errors::AuthError, token::ParsedToken, validator::VerifiedToken};
use async_trait::async_trait;
use jsonwebtoken::jwk::Jwk;

/// Validates raw bearer tokens
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Verify signature and claims of a raw compact token
    async fn validate(&self, token: &str) -> Result<VerifiedToken, AuthError>;
}

/// Capability that maps a parsed token to the key that should verify it
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Return the JWK for the token's header.
    ///
    /// Implementations must reject tokens whose declared algorithm they do
    /// not serve before looking up any key.
    async fn key_for_token(&self, token: &ParsedToken) -> Result<Jwk, AuthError>;
}
