#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

// Core modules
pub mod errors;
pub mod traits;

// Token model and claim policy
pub mod claims_error;
pub mod config;
pub mod standard_claims;
pub mod token;
pub mod validation;

// Key resolution and validation pipeline
pub mod jwks;
pub mod resolver;
pub mod validator;

#[cfg(test)]
mod testutil;

// Core exports
pub use errors::{AuthError, FetchError};
pub use traits::{KeyResolver, TokenValidator};

// Token and claims exports
pub use claims_error::ClaimsError;
pub use config::{JwksConfig, ValidatorConfig};
pub use standard_claims::{Audience, StandardClaim, StandardClaims};
pub use token::{ParsedToken, TokenHeader};
pub use validation::{ValidationConfig, validate_claims};

// Pipeline exports
pub use jwks::JwksClient;
pub use resolver::JwksKeyResolver;
pub use validator::{Validator, VerifiedToken};

// JOSE types that appear in the public API
pub use jsonwebtoken::Algorithm;
pub use jsonwebtoken::jwk::Jwk;
