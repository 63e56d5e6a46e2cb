//! In-Memory Store Implementations
//!
//! HashMap-backed stores behind tokio RwLocks, with the same contracts as
//! the Postgres stores. Used by the test suites and by single-process
//! deployments that do not want a database.

use super::{SessionStore, UserStore};
use crate::error::AuthError;
use crate::models::{NewUser, RefreshSession, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// User store held entirely in process memory
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == new_user.email) {
            return Err(AuthError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.read().await;

        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<Option<User>, AuthError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.id != id && u.email == email) {
            return Err(AuthError::DuplicateEmail);
        }

        match users.get_mut(&id) {
            Some(user) => {
                user.name = name.to_string();
                user.email = email.to_string();
                user.updated_at = Utc::now();
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
        }

        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, AuthError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);

        Ok(users)
    }
}

/// Session store held entirely in process memory
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, RefreshSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshSession, AuthError> {
        let mut sessions = self.sessions.write().await;

        // The token column carries a unique index; surface a collision the
        // same way the database backend would.
        if sessions.values().any(|s| s.token == token) {
            return Err(AuthError::StoreUnavailable(
                "refresh token already in use".to_string(),
            ));
        }

        let session = RefreshSession {
            id: Uuid::new_v4(),
            user_id,
            token: token.to_string(),
            expires_at,
            created_at: Utc::now(),
        };
        sessions.insert(session.id, session.clone());

        Ok(session)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshSession>, AuthError> {
        let sessions = self.sessions.read().await;

        Ok(sessions.values().find(|s| s.token == token).cloned())
    }

    async fn rotate(
        &self,
        id: Uuid,
        current_token: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        let mut sessions = self.sessions.write().await;

        // Same compare-and-swap contract as the Postgres store: the swap
        // happens only while the row still holds current_token.
        match sessions.get_mut(&id) {
            Some(session) if session.token == current_token => {
                session.token = new_token.to_string();
                session.expires_at = new_expires_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_by_token(&self, token: &str) -> Result<(), AuthError> {
        let mut sessions = self.sessions.write().await;

        sessions.retain(|_, s| s.token != token);

        Ok(())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), AuthError> {
        self.sessions.write().await.remove(&id);

        Ok(())
    }
}
