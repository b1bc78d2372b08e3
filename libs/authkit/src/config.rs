use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

/// Remote JWK Set settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwksConfig {
    /// URL of the JWK Set document.
    pub uri: String,

    /// Upper bound for one JWK Set download, in seconds.
    #[serde(default = "default_fetch_timeout_seconds")]
    pub fetch_timeout_seconds: u64,
}

impl JwksConfig {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            fetch_timeout_seconds: default_fetch_timeout_seconds(),
        }
    }

    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

/// Expected claims and algorithm for a [`crate::Validator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Exact value required in `iss`.
    pub issuer: String,

    /// Value that `aud` must contain.
    pub audience: String,

    /// The only signature algorithm accepted.
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,

    /// Clock skew tolerated on `exp`, `nbf` and `iat`, in seconds.
    #[serde(default)]
    pub leeway_seconds: u64,

    /// Reject tokens that carry no `exp` claim.
    #[serde(default)]
    pub require_exp: bool,
}

impl ValidatorConfig {
    /// RS256 settings with no leeway and optional `exp`.
    #[must_use]
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            algorithm: default_algorithm(),
            leeway_seconds: 0,
            require_exp: false,
        }
    }
}

fn default_fetch_timeout_seconds() -> u64 {
    10
}

fn default_algorithm() -> Algorithm {
    Algorithm::RS256
}
