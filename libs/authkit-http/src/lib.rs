//! HTTP glue for `authkit`.
//!
//! - [`extract_bearer_token`] / [`extract_token`] / [`extract_key`] - pull a
//!   bearer credential out of request headers
//! - [`status_for`] - map an [`authkit::AuthError`] to an HTTP status
//! - [`authn_middleware`] - axum middleware that validates the bearer token
//!   and stores the [`authkit::VerifiedToken`] in request extensions
//!
//! ## Usage
//!
//! ```ignore
//! let state = AuthState::new(Arc::new(validator));
//! let app = Router::new()
//!     .route("/me", get(me))
//!     .layer(axum::middleware::from_fn_with_state(state, authn_middleware));
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod extract;
pub mod middleware;

pub use extract::{extract_bearer_token, extract_key, extract_token, status_for};
pub use middleware::{AuthState, authn_middleware};
