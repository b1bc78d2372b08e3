//! Token validation pipeline.
//!
//! A token is accepted only after, in order:
//! 1. it parses as a compact-serialized JWS;
//! 2. its header declares the validator's algorithm;
//! 3. the key resolver returns a key for it;
//! 4. the signature verifies with that key;
//! 5. its registered claims satisfy the expected claim set.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;

use crate::claims_error::ClaimsError;
use crate::config::ValidatorConfig;
use crate::errors::AuthError;
use crate::jwks::JwksClient;
use crate::resolver::JwksKeyResolver;
use crate::standard_claims::StandardClaims;
use crate::token::{ParsedToken, TokenHeader};
use crate::traits::{KeyResolver, TokenValidator};
use crate::validation::{ValidationConfig, validate_claims};

/// Validates tokens signed with one algorithm against one expected claim set.
///
/// Holds no mutable state; share it behind an `Arc`.
pub struct Validator {
    expected: ValidationConfig,
    algorithm: Algorithm,
    resolver: Arc<dyn KeyResolver>,
    verification: Validation,
}

impl Validator {
    #[must_use]
    pub fn new(config: &ValidatorConfig, resolver: Arc<dyn KeyResolver>) -> Self {
        Self {
            expected: ValidationConfig::from(config),
            algorithm: config.algorithm,
            resolver,
            verification: signature_only(config.algorithm),
        }
    }

    /// RS256 validator checking issuer, audience and expiry.
    #[must_use]
    pub fn rs256(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        resolver: Arc<dyn KeyResolver>,
    ) -> Self {
        Self::new(&ValidatorConfig::new(issuer, audience), resolver)
    }

    /// Validator whose keys come from `client`, for the configured algorithm.
    #[must_use]
    pub fn with_jwks(config: &ValidatorConfig, client: Arc<JwksClient>) -> Self {
        let resolver = JwksKeyResolver::new(client, config.algorithm);
        Self::new(config, Arc::new(resolver))
    }

    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[must_use]
    pub fn expected(&self) -> &ValidationConfig {
        &self.expected
    }

    /// Validate a raw token at the current time.
    ///
    /// # Errors
    ///
    /// See [`Validator::validate_at`].
    pub async fn validate(&self, raw: &str) -> Result<VerifiedToken, AuthError> {
        self.validate_at(raw, OffsetDateTime::now_utc()).await
    }

    /// Validate a raw token as of `now`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Parse`] for a malformed token
    /// - [`AuthError::MissingHeader`] / [`AuthError::AlgorithmMismatch`] for
    ///   an untrusted header
    /// - [`AuthError::KeyNotFound`] / [`AuthError::Fetch`] from key resolution
    /// - [`AuthError::InvalidKey`] if the resolved key cannot verify the token
    /// - [`AuthError::Signature`] for a bad signature
    /// - [`AuthError::Claims`] if a registered claim fails policy
    pub async fn validate_at(
        &self,
        raw: &str,
        now: OffsetDateTime,
    ) -> Result<VerifiedToken, AuthError> {
        let token = ParsedToken::parse(raw)?;
        let header = token.header()?.clone();
        header.ensure_algorithm(self.algorithm)?;

        let key = self.verification_key(&token).await?;
        let claims: StandardClaims = decode_verified(&token, &key, &self.verification)?;
        validate_claims(&claims, &self.expected, now)?;

        Ok(VerifiedToken {
            token,
            header,
            key,
            claims,
            verification: self.verification.clone(),
        })
    }

    /// Validate a raw token and decode its payload into `T`.
    ///
    /// # Errors
    ///
    /// See [`Validator::validate_at`] and [`VerifiedToken::decode`].
    pub async fn valid_claims<T>(&self, raw: &str) -> Result<T, AuthError>
    where
        T: DeserializeOwned + Clone,
    {
        self.validate(raw).await?.decode()
    }

    /// Decode the payload of a signed token into `T` without applying the
    /// claim policy. The signature is still verified.
    ///
    /// # Errors
    ///
    /// Same as [`Validator::validate_at`], except no [`AuthError::Claims`]
    /// policy failures; a payload that does not fit `T` is
    /// [`ClaimsError::Malformed`].
    pub async fn claims<T>(&self, token: &ParsedToken) -> Result<T, AuthError>
    where
        T: DeserializeOwned + Clone,
    {
        token.header()?.ensure_algorithm(self.algorithm)?;
        let key = self.verification_key(token).await?;
        decode_verified(token, &key, &self.verification)
    }

    async fn verification_key(&self, token: &ParsedToken) -> Result<DecodingKey, AuthError> {
        let jwk = self.resolver.key_for_token(token).await?;
        DecodingKey::from_jwk(&jwk).map_err(|e| AuthError::InvalidKey(e.to_string()))
    }
}

#[async_trait]
impl TokenValidator for Validator {
    async fn validate(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        self.validate_at(token, OffsetDateTime::now_utc()).await
    }
}

/// A token whose signature and claims passed validation.
#[derive(Clone)]
pub struct VerifiedToken {
    token: ParsedToken,
    header: TokenHeader,
    key: DecodingKey,
    claims: StandardClaims,
    verification: Validation,
}

impl VerifiedToken {
    #[must_use]
    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    #[must_use]
    pub fn claims(&self) -> &StandardClaims {
        &self.claims
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.claims.sub.as_deref()
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        self.token.raw()
    }

    /// Decode the payload into a caller type, re-verifying the signature with
    /// the key that validated the token.
    ///
    /// # Errors
    ///
    /// Returns [`ClaimsError::Malformed`] if the payload does not fit `T`.
    pub fn decode<T>(&self) -> Result<T, AuthError>
    where
        T: DeserializeOwned + Clone,
    {
        decode_verified(&self.token, &self.key, &self.verification)
    }
}

impl std::fmt::Debug for VerifiedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifiedToken")
            .field("header", &self.header)
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

// Registered claims are checked by `validate_claims`, so jsonwebtoken only
// verifies the signature and algorithm binding here.
fn signature_only(algorithm: Algorithm) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.required_spec_claims = HashSet::new();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation
}

fn decode_verified<T>(
    token: &ParsedToken,
    key: &DecodingKey,
    validation: &Validation,
) -> Result<T, AuthError>
where
    T: DeserializeOwned + Clone,
{
    jsonwebtoken::decode::<T>(token.raw(), key, validation)
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
                AuthError::Parse(err.to_string())
            }
            ErrorKind::Json(_) => ClaimsError::Malformed(err.to_string()).into(),
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidKeyFormat => {
                AuthError::InvalidKey(err.to_string())
            }
            _ => AuthError::Signature,
        })
}
