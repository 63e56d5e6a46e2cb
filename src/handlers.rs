//! Authentication HTTP Handlers
//!
//! REST API endpoints for account and session operations.

use crate::error::AuthError;
use crate::extractors::{AuthUser, BearerToken};
use crate::middleware;
use crate::models::*;
use crate::service::AuthService;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;
use validator::Validate;

/// Shared auth service state
pub type AuthState = Arc<AuthService>;

// ============================================
// Route Builder
// ============================================

/// Create authentication routes
pub fn create_routes(auth_service: Arc<AuthService>) -> Router {
    // Public routes (no authentication required). /auth/me checks its own
    // bearer token so that an unknown-user lookup can surface as 404.
    let public = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/me", get(get_current_user));

    // Protected routes (require authentication)
    let protected = Router::new()
        .route("/auth/change-password", post(change_password))
        .route("/auth/profile", put(update_profile))
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .layer(axum_middleware::from_fn_with_state(
            auth_service.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(auth_service)
}

// ============================================
// Registration
// ============================================

/// POST /auth/register
///
/// Register a new user account
pub async fn register(
    State(auth): State<AuthState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let user = auth.register(req).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

// ============================================
// Login / Logout
// ============================================

/// POST /auth/login
///
/// Authenticate user and return access/refresh tokens
pub async fn login(
    State(auth): State<AuthState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let response = auth.login(req).await?;

    Ok(Json(response))
}

/// POST /auth/logout
///
/// Delete the refresh session. Succeeds whether or not the token was live.
pub async fn logout(
    State(auth): State<AuthState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    auth.logout(&req.refresh_token).await?;

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

// ============================================
// Token Refresh
// ============================================

/// POST /auth/refresh
///
/// Exchange a refresh token for a new token pair
pub async fn refresh_token(
    State(auth): State<AuthState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let response = auth.refresh(&req.refresh_token).await?;

    Ok(Json(response))
}

// ============================================
// Password Management
// ============================================

/// POST /auth/change-password
///
/// Change password for authenticated user
pub async fn change_password(
    State(auth): State<AuthState>,
    user: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    auth.change_password(user.id, req).await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

// ============================================
// User Profile
// ============================================

/// GET /auth/me
///
/// Resolve the bearer token to the current user
pub async fn get_current_user(
    State(auth): State<AuthState>,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse, AuthError> {
    let user = auth.resolve_identity(&token).await?;

    Ok(Json(user))
}

/// PUT /auth/profile
///
/// Update name and email for authenticated user
pub async fn update_profile(
    State(auth): State<AuthState>,
    user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AuthError> {
    req.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let updated = auth.update_profile(user.id, req).await?;

    Ok(Json(updated))
}

// ============================================
// User Management
// ============================================

/// GET /users
///
/// List all users
pub async fn list_users(State(auth): State<AuthState>) -> Result<impl IntoResponse, AuthError> {
    let users = auth.list_users().await?;

    Ok(Json(users))
}

/// GET /users/:id
///
/// Get a single user by id
pub async fn get_user(
    State(auth): State<AuthState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AuthError> {
    let user = auth.get_user(id).await?;

    Ok(Json(user))
}
