use time::OffsetDateTime;

use crate::claims_error::ClaimsError;
use crate::config::ValidatorConfig;
use crate::standard_claims::{StandardClaim, StandardClaims};

/// Expected claim set checked against every verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    pub issuer: String,
    pub audience: String,
    /// Clock skew tolerance in seconds.
    pub leeway: i64,
    pub require_exp: bool,
}

impl ValidationConfig {
    #[must_use]
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            leeway: 0,
            require_exp: false,
        }
    }
}

impl From<&ValidatorConfig> for ValidationConfig {
    fn from(cfg: &ValidatorConfig) -> Self {
        Self {
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            leeway: i64::try_from(cfg.leeway_seconds).unwrap_or(i64::MAX),
            require_exp: cfg.require_exp,
        }
    }
}

/// Check registered claims against `expected` at time `now`.
///
/// Claims are checked in order: `iss`, `aud`, `exp`, `nbf`, `iat`.
///
/// # Errors
///
/// Returns the first [`ClaimsError`] encountered.
pub fn validate_claims(
    claims: &StandardClaims,
    expected: &ValidationConfig,
    now: OffsetDateTime,
) -> Result<(), ClaimsError> {
    let now = now.unix_timestamp();

    match &claims.iss {
        Some(iss) if *iss == expected.issuer => {}
        Some(iss) => {
            return Err(ClaimsError::InvalidIssuer {
                expected: expected.issuer.clone(),
                actual: iss.clone(),
            });
        }
        None => return Err(ClaimsError::MissingClaim(StandardClaim::Iss)),
    }

    let Some(aud) = &claims.aud else {
        return Err(ClaimsError::MissingClaim(StandardClaim::Aud));
    };
    if !aud.contains(&expected.audience) {
        return Err(ClaimsError::InvalidAudience {
            expected: expected.audience.clone(),
            actual: aud.to_vec(),
        });
    }

    match claims.exp {
        Some(exp) if exp.saturating_add(expected.leeway) <= now => {
            return Err(ClaimsError::Expired);
        }
        None if expected.require_exp => {
            return Err(ClaimsError::MissingClaim(StandardClaim::Exp));
        }
        _ => {}
    }

    if claims
        .nbf
        .is_some_and(|nbf| nbf > now.saturating_add(expected.leeway))
    {
        return Err(ClaimsError::NotYetValid);
    }

    if claims
        .iat
        .is_some_and(|iat| iat > now.saturating_add(expected.leeway))
    {
        return Err(ClaimsError::IssuedInFuture);
    }

    Ok(())
}
