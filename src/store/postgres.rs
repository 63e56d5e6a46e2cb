//! Postgres Store Implementations
//!
//! sqlx-backed persistence for users and refresh sessions.

use super::{SessionStore, UserStore};
use crate::error::AuthError;
use crate::models::{NewUser, RefreshSession, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}

/// User store backed by the users table
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.role)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::DuplicateEmail
            } else {
                e.into()
            }
        })?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, email = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::DuplicateEmail
            } else {
                e.into()
            }
        })?;

        Ok(user)
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, AuthError> {
        let users = sqlx::query_as("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&self.db)
            .await?;

        Ok(users)
    }
}

/// Session store backed by the refresh_sessions table
#[derive(Clone)]
pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshSession, AuthError> {
        let session = sqlx::query_as::<_, RefreshSession>(
            r#"
            INSERT INTO refresh_sessions (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(&self.db)
        .await?;

        Ok(session)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshSession>, AuthError> {
        let session = sqlx::query_as("SELECT * FROM refresh_sessions WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.db)
            .await?;

        Ok(session)
    }

    async fn rotate(
        &self,
        id: Uuid,
        current_token: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        // Guarding on the token column makes this a compare-and-swap: of
        // two concurrent refreshes carrying the same token, only one
        // matches the row.
        let result = sqlx::query(
            r#"
            UPDATE refresh_sessions
            SET token = $3, expires_at = $4
            WHERE id = $1 AND token = $2
            "#,
        )
        .bind(id)
        .bind(current_token)
        .bind(new_token)
        .bind(new_expires_at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_token(&self, token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM refresh_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM refresh_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
