//! Password hashing and verification using Argon2id
//!
//! The hasher is built once from configuration and shared. Hashing and
//! verification are deliberately slow; async callers run them on the
//! blocking pool.

use crate::{config::AuthConfig, error::AuthError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Password hasher with configured cost parameters
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a hasher from configured Argon2 parameters
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.argon2_memory_cost,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| {
            tracing::error!("Invalid Argon2 parameters: {:?}", e);
            AuthError::Hashing
        })?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Ok(Self { argon2 })
    }

    /// Hash a password into a salted PHC string
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AuthError::Hashing
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash
    ///
    /// A mismatch is `Ok(false)`, not an error. Only an unusable stored
    /// hash or a primitive failure produces `Err`.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            tracing::error!("Malformed stored password hash: {:?}", e);
            AuthError::Hashing
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => {
                tracing::error!("Password verification failed: {:?}", e);
                Err(AuthError::Hashing)
            }
        }
    }
}
