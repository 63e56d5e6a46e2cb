//! Authentication Service
//!
//! Core account and session logic: registration, credential verification,
//! token issuance, refresh rotation, and profile management. Transport
//! concerns stay out; callers hand in typed requests and get typed results
//! or an `AuthError` back.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::*;
use crate::password::PasswordHasher;
use crate::store::{SessionStore, UserStore};
use crate::token::TokenIssuer;

use std::sync::Arc;
use uuid::Uuid;

/// Role assigned to self-registered accounts
const DEFAULT_ROLE: &str = "user";

/// Plaintext hashed once at startup and verified against whenever a login
/// names an unknown email, so that path costs as much as a real mismatch.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// Authentication service
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    hasher: Arc<PasswordHasher>,
    issuer: TokenIssuer,
    config: AuthConfig,
    decoy_hash: String,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        config: AuthConfig,
    ) -> Result<Self, AuthError> {
        let hasher = Arc::new(PasswordHasher::new(&config)?);
        let issuer = TokenIssuer::new(&config)?;
        let decoy_hash = hasher.hash(DECOY_PASSWORD)?;

        Ok(Self {
            users,
            sessions,
            hasher,
            issuer,
            config,
            decoy_hash,
        })
    }

    // ============================================
    // Password Hashing
    // ============================================

    /// Hash a password on the blocking pool
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                tracing::error!("Hashing task failed: {:?}", e);
                AuthError::Hashing
            })?
    }

    /// Verify a password on the blocking pool
    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| {
                tracing::error!("Verification task failed: {:?}", e);
                AuthError::Hashing
            })?
    }

    /// Validate password strength against the configured policy
    fn validate_password(&self, password: &str) -> Result<(), AuthError> {
        if password.len() < self.config.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        Ok(())
    }

    // ============================================
    // User Registration
    // ============================================

    /// Register a new user
    pub async fn register(&self, req: RegisterRequest) -> Result<UserResponse, AuthError> {
        self.validate_password(&req.password)?;

        let password_hash = self.hash_password(&req.password).await?;

        // Email uniqueness is the store's job; checking here first would
        // just race the insert.
        let user = self
            .users
            .create(NewUser {
                name: req.name,
                email: req.email,
                password_hash,
                role: DEFAULT_ROLE.to_string(),
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(UserResponse::from(user))
    }

    // ============================================
    // Login / Logout
    // ============================================

    /// Attempt to login a user
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        let user = match self.users.find_by_email(&req.email).await? {
            Some(user) => user,
            None => {
                // Unknown email burns a verification against the decoy
                // hash; the response is byte-for-byte the wrong-password
                // one and takes comparable time.
                let _ = self.verify_password(&req.password, &self.decoy_hash).await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self
            .verify_password(&req.password, &user.password_hash)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.issuer.issue_access(user.id)?;
        let refresh_token = self.issuer.issue_refresh();

        self.sessions
            .create(user.id, &refresh_token, self.issuer.refresh_expires_at())
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.issuer.access_token_expiration(),
            refresh_expires_in: self.issuer.refresh_token_expiration(),
        })
    }

    /// Logout by deleting the refresh session
    ///
    /// Idempotent: logging out an unknown or already-deleted token is
    /// still a success.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.sessions.delete_by_token(refresh_token).await?;

        tracing::debug!("Refresh session deleted on logout");

        Ok(())
    }

    // ============================================
    // Token Refresh
    // ============================================

    /// Exchange a refresh token for a new token pair (with rotation)
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let session = self
            .sessions
            .find_by_token(refresh_token)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if session.is_expired() {
            // Lazy purge: the row is spent either way
            self.sessions.delete_by_id(session.id).await?;
            return Err(AuthError::ExpiredToken);
        }

        // Mint both tokens before the swap; the rotation is the last step
        // that can fail, so a session never ends up holding a token that
        // was never handed out.
        let access_token = self.issuer.issue_access(session.user_id)?;
        let new_refresh_token = self.issuer.issue_refresh();

        let rotated = self
            .sessions
            .rotate(
                session.id,
                refresh_token,
                &new_refresh_token,
                self.issuer.refresh_expires_at(),
            )
            .await?;

        if !rotated {
            // A concurrent refresh rotated first; this token is spent
            return Err(AuthError::InvalidToken);
        }

        tracing::debug!(user_id = %session.user_id, "Refresh token rotated");

        Ok(TokenPair {
            access_token,
            refresh_token: new_refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.issuer.access_token_expiration(),
            refresh_expires_in: self.issuer.refresh_token_expiration(),
        })
    }

    // ============================================
    // Password Management
    // ============================================

    /// Change password for an authenticated user
    pub async fn change_password(
        &self,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !self
            .verify_password(&req.current_password, &user.password_hash)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        self.validate_password(&req.new_password)?;

        let password_hash = self.hash_password(&req.new_password).await?;
        self.users
            .update_password_hash(user.id, &password_hash)
            .await?;

        // TODO: add SessionStore::delete_all_for_user and call it here;
        // refresh sessions issued before the change currently stay valid
        // until they expire.
        tracing::info!(user_id = %user.id, "Password changed");

        Ok(())
    }

    // ============================================
    // Identity
    // ============================================

    /// Resolve an access token to the user it identifies
    pub async fn resolve_identity(&self, access_token: &str) -> Result<UserResponse, AuthError> {
        let claims = self.issuer.parse_access(access_token)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::NotFound)?;

        Ok(UserResponse::from(user))
    }

    /// Validate an access token and return its claims
    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        self.issuer.parse_access(token)
    }

    // ============================================
    // User Management
    // ============================================

    /// Update a user's name and email
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        req: UpdateProfileRequest,
    ) -> Result<UserResponse, AuthError> {
        let user = self
            .users
            .update_profile(user_id, &req.name, &req.email)
            .await?
            .ok_or(AuthError::NotFound)?;

        tracing::info!(user_id = %user.id, "Profile updated");

        Ok(UserResponse::from(user))
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: Uuid) -> Result<UserResponse, AuthError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        Ok(UserResponse::from(user))
    }

    /// List all users
    pub async fn list_users(&self) -> Result<Vec<UserResponse>, AuthError> {
        let users = self.users.list().await?;

        Ok(users.iter().map(UserResponse::from).collect())
    }
}
