//! Authentication Extractors
//!
//! Axum extractors for authenticated request context.

use crate::error::AuthError;
use crate::middleware;
use crate::models::AccessTokenClaims;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Authenticated user identity
///
/// Available only on routes behind `middleware::require_auth`; the claims
/// it reads are placed in request extensions by that middleware and by
/// nothing else.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<AccessTokenClaims>()
            .ok_or_else(|| AuthError::InvalidToken.into_response())?;

        Ok(AuthUser { id: claims.sub })
    }
}

/// Raw bearer token from the Authorization header
///
/// For handlers that consume the token itself rather than the identity it
/// proves.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok());

        let token = middleware::bearer_token(auth_header).map_err(|e| e.into_response())?;

        Ok(BearerToken(token.to_string()))
    }
}
