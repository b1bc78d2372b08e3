use authkit::{AuthError, Jwk, KeyResolver, ParsedToken};
use http::header::AUTHORIZATION;
use http::{HeaderMap, StatusCode};

const BEARER_PREFIX: &str = "bearer ";

/// Return the bearer token from the `Authorization` header.
///
/// The `Bearer ` prefix is matched case-insensitively and must be followed by
/// at least one character.
///
/// # Errors
///
/// Returns [`AuthError::TokenNotPresent`] if the header is missing, is not
/// visible ASCII, or does not carry a bearer credential.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::TokenNotPresent)?;

    match (value.get(..BEARER_PREFIX.len()), value.get(BEARER_PREFIX.len()..)) {
        (Some(prefix), Some(token))
            if prefix.eq_ignore_ascii_case(BEARER_PREFIX) && !token.is_empty() =>
        {
            Ok(token)
        }
        _ => Err(AuthError::TokenNotPresent),
    }
}

/// Return the bearer token parsed but not verified.
///
/// # Errors
///
/// Returns [`AuthError::TokenNotPresent`] without a bearer credential and
/// [`AuthError::Parse`] if it is not a compact-serialized token.
pub fn extract_token(headers: &HeaderMap) -> Result<ParsedToken, AuthError> {
    ParsedToken::parse(extract_bearer_token(headers)?)
}

/// Return the key that should verify the request's bearer token.
///
/// # Errors
///
/// Errors of [`extract_token`] and of the resolver.
pub async fn extract_key(
    headers: &HeaderMap,
    resolver: &dyn KeyResolver,
) -> Result<Jwk, AuthError> {
    let token = extract_token(headers)?;
    resolver.key_for_token(&token).await
}

/// HTTP status a host should answer with for an authentication failure.
#[must_use]
pub fn status_for(err: &AuthError) -> StatusCode {
    if err.is_infrastructure() {
        StatusCode::SERVICE_UNAVAILABLE
    } else if err.is_credential_error() {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
