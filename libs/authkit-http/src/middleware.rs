use std::sync::Arc;

use authkit::{AuthError, TokenValidator};
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::extract::{extract_bearer_token, status_for};

/// Shared state for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<dyn TokenValidator>,
}

impl AuthState {
    #[must_use]
    pub fn new(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }
}

/// Authentication middleware backed by a [`TokenValidator`].
///
/// For each request:
/// 1. Extracts the bearer token; a missing credential is `401` and the
///    validator is not called
/// 2. Validates the token
/// 3. On success inserts the [`authkit::VerifiedToken`] into request
///    extensions and runs the next handler
pub async fn authn_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match extract_bearer_token(req.headers()) {
        Ok(token) => token.to_owned(),
        Err(err) => return auth_error_to_response(&err),
    };

    match state.validator.validate(&token).await {
        Ok(verified) => {
            req.extensions_mut().insert(verified);
            next.run(req).await
        }
        Err(err) => auth_error_to_response(&err),
    }
}

fn auth_error_to_response(err: &AuthError) -> Response {
    let status = status_for(err);

    if err.is_infrastructure() {
        tracing::warn!(error = %err, "Bearer token could not be validated");
    } else {
        tracing::debug!(error = %err, "Bearer token rejected");
    }

    let message = match err {
        AuthError::TokenNotPresent => "Missing or invalid Authorization header",
        _ if err.is_infrastructure() => "Authentication service unavailable",
        _ if err.is_credential_error() => "Unauthorized",
        _ => "Internal authentication error",
    };

    (status, message).into_response()
}
