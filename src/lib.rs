//! User Account and Session Authentication Service
//!
//! A minimal account service providing:
//! - User registration and login
//! - JWT access tokens with rotating opaque refresh tokens
//! - Argon2id password hashing
//! - Logout, password change, and profile management
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `JWT_SECRET` - Secret key for signing JWTs (required, min 32 chars)
//! - `JWT_ACCESS_EXPIRATION` - Access token expiration in seconds (default: 900)
//! - `JWT_REFRESH_EXPIRATION` - Refresh token expiration in seconds (default: 604800)
//! - `ARGON2_MEMORY_COST` - Argon2 memory cost in KiB (default: 65536)
//! - `ARGON2_TIME_COST` - Argon2 iterations (default: 3)
//! - `ARGON2_PARALLELISM` - Argon2 lanes (default: 4)
//! - `MIN_PASSWORD_LENGTH` - Password policy minimum (default: 8)
//! - `DATABASE_URL` - PostgreSQL connection string (required for the Postgres stores)
//!
//! # Usage
//!
//! ```rust,ignore
//! use auth_service::{build, create_routes, run_migrations, AuthConfig};
//!
//! run_migrations(&db_pool).await?;
//!
//! let config = AuthConfig::from_env();
//! let auth = build(db_pool, config)?;
//! let app = create_routes(auth);
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

// Re-export commonly used types
pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::{AuthUser, BearerToken};
pub use handlers::AuthState;
pub use models::*;
pub use password::PasswordHasher;
pub use service::AuthService;
pub use store::{SessionStore, UserStore};
pub use token::TokenIssuer;

use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;

/// Run database migrations
pub async fn run_migrations(db: &PgPool) -> Result<(), AuthError> {
    tracing::info!("Running authentication database migrations");

    // Create users table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(100) NOT NULL,
            email VARCHAR(255) NOT NULL UNIQUE,
            password_hash VARCHAR(255) NOT NULL,
            role VARCHAR(50) NOT NULL DEFAULT 'user',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);")
        .execute(db)
        .await?;

    // Create refresh sessions table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS refresh_sessions (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            token VARCHAR(255) NOT NULL UNIQUE,
            expires_at TIMESTAMPTZ NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_refresh_sessions_user ON refresh_sessions(user_id);",
    )
    .execute(db)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_refresh_sessions_expires ON refresh_sessions(expires_at);",
    )
    .execute(db)
    .await?;

    tracing::info!("Authentication migrations completed successfully");
    Ok(())
}

/// Build an auth service backed by Postgres stores
pub fn build(db: PgPool, config: AuthConfig) -> Result<Arc<AuthService>, AuthError> {
    config.validate()?;

    let users = Arc::new(store::postgres::PgUserStore::new(db.clone()));
    let sessions = Arc::new(store::postgres::PgSessionStore::new(db));

    Ok(Arc::new(AuthService::new(users, sessions, config)?))
}

/// Build an auth service backed by in-memory stores
///
/// For tests and single-process deployments; every account and session
/// disappears with the process.
pub fn build_in_memory(config: AuthConfig) -> Result<Arc<AuthService>, AuthError> {
    config.validate()?;

    let users = Arc::new(store::memory::InMemoryUserStore::new());
    let sessions = Arc::new(store::memory::InMemorySessionStore::new());

    Ok(Arc::new(AuthService::new(users, sessions, config)?))
}

/// Create authentication routes
///
/// Call this after building the service to get the router with all auth
/// endpoints.
pub fn create_routes(auth_service: Arc<AuthService>) -> Router {
    handlers::create_routes(auth_service)
}

// ============================================
// Module Tests
// ============================================
