//! Compact-serialized JWS tokens, parsed but not yet verified.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::AuthError;

/// Protected header of a signed token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenHeader {
    /// Declared signature algorithm, kept verbatim.
    pub alg: String,

    /// Key ID naming the JWK that should verify the token.
    #[serde(default)]
    pub kid: Option<String>,

    #[serde(default)]
    pub typ: Option<String>,
}

impl TokenHeader {
    /// Require the declared algorithm to be exactly `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AlgorithmMismatch`] if the header names any other
    /// algorithm. The comparison is case-sensitive.
    pub fn ensure_algorithm(&self, expected: Algorithm) -> Result<(), AuthError> {
        match self.alg.parse::<Algorithm>() {
            Ok(declared) if declared == expected => Ok(()),
            _ => Err(AuthError::AlgorithmMismatch {
                expected: algorithm_name(expected),
                actual: self.alg.clone(),
            }),
        }
    }

    /// Key ID used for JWK lookup. Tokens without `kid` map to the empty ID.
    #[must_use]
    pub fn key_id(&self) -> &str {
        self.kid.as_deref().unwrap_or_default()
    }
}

/// A token split into its parts with header and payload decoded.
///
/// Nothing here is trusted until a [`crate::Validator`] has checked the
/// signature.
#[derive(Debug, Clone)]
pub struct ParsedToken {
    raw: String,
    headers: Vec<TokenHeader>,
    payload: Map<String, Value>,
}

impl ParsedToken {
    /// Parse a compact-serialized signed token (`header.payload.signature`).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Parse`] if the token does not have three
    /// base64url segments, if the header or payload is not a JSON object, or
    /// if a registered header parameter has the wrong type.
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let mut segments = raw.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::Parse(
                "compact serialization must have three segments".to_owned(),
            ));
        };

        let header: TokenHeader = decode_segment("header", header)?;
        // Registered header fields must be well typed before any key lookup.
        // Unknown algorithms are left to `ensure_algorithm`.
        if header.alg.parse::<Algorithm>().is_ok() {
            jsonwebtoken::decode_header(raw)
                .map_err(|e| AuthError::Parse(format!("header: {e}")))?;
        }
        let payload: Map<String, Value> = decode_segment("payload", payload)?;
        URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|e| AuthError::Parse(format!("signature: {e}")))?;

        Ok(Self {
            raw: raw.to_owned(),
            headers: vec![header],
            payload,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(raw: &str, headers: Vec<TokenHeader>) -> Self {
        Self {
            raw: raw.to_owned(),
            headers,
            payload: Map::new(),
        }
    }

    /// The token exactly as presented.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn headers(&self) -> &[TokenHeader] {
        &self.headers
    }

    /// The header that governs algorithm and key selection.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingHeader`] if the token carries no header.
    pub fn header(&self) -> Result<&TokenHeader, AuthError> {
        self.headers.first().ok_or(AuthError::MissingHeader)
    }

    /// Unverified payload. Do not base decisions on it.
    #[must_use]
    pub fn unverified_payload(&self) -> &Map<String, Value> {
        &self.payload
    }
}

fn algorithm_name(alg: Algorithm) -> String {
    match serde_json::to_value(alg) {
        Ok(Value::String(name)) => name,
        _ => String::new(),
    }
}

fn decode_segment<T: serde::de::DeserializeOwned>(
    name: &str,
    segment: &str,
) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| AuthError::Parse(format!("{name}: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| AuthError::Parse(format!("{name}: {e}")))
}
