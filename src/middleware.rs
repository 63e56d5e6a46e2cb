//! Authentication Middleware
//!
//! Bearer token validation in front of protected routes. Validation goes
//! through the shared service; the middleware holds no key material of
//! its own.

use crate::error::AuthError;
use crate::handlers::AuthState;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Extract the bearer token from an Authorization header value
pub(crate) fn bearer_token(auth_header: Option<&str>) -> Result<&str, AuthError> {
    auth_header
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AuthError::InvalidToken)
}

/// Require an authenticated user
///
/// Validates the bearer token and stores the verified claims in request
/// extensions for use by extractors.
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = bearer_token(auth_header)?;
    let claims = auth.verify_access_token(token)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
