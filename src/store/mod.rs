//! Persistence Contracts
//!
//! Storage traits for users and refresh sessions. The service only ever
//! talks to these traits; Postgres and in-memory implementations live in
//! the submodules.

pub mod memory;
pub mod postgres;

use crate::error::AuthError;
use crate::models::{NewUser, RefreshSession, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// User persistence contract
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. A taken email is `DuplicateEmail`.
    async fn create(&self, new_user: NewUser) -> Result<User, AuthError>;

    /// Find a user by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// Overwrite name and email. `None` when the user does not exist;
    /// an email already taken by another user is `DuplicateEmail`.
    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<Option<User>, AuthError>;

    /// Replace the stored password hash
    async fn update_password_hash(&self, id: Uuid, password_hash: &str)
        -> Result<(), AuthError>;

    /// List all users
    async fn list(&self) -> Result<Vec<User>, AuthError>;
}

/// Refresh session persistence contract
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session row for a fresh login
    async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshSession, AuthError>;

    /// Look up the session a token currently belongs to
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshSession>, AuthError>;

    /// Swap the session token, conditional on it still holding `current_token`
    ///
    /// Compare-and-swap: `Ok(false)` means the row is gone or its token
    /// changed underneath the caller, i.e. a concurrent rotation won.
    async fn rotate(
        &self,
        id: Uuid,
        current_token: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<bool, AuthError>;

    /// Delete the session holding this token
    ///
    /// Idempotent: a token that maps to nothing is not an error.
    async fn delete_by_token(&self, token: &str) -> Result<(), AuthError>;

    /// Delete a session row by id
    async fn delete_by_id(&self, id: Uuid) -> Result<(), AuthError>;
}
