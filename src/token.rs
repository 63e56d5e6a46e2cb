//! Token issuance and validation
//!
//! Two token kinds with different jobs: short-lived signed JWT access
//! tokens that prove identity statelessly, and long-lived opaque refresh
//! tokens that are nothing but entropy and only mean something to the
//! session store.

use crate::{config::AuthConfig, error::AuthError, models::AccessTokenClaims};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use uuid::Uuid;

/// Random bytes per refresh token (256 bits)
const REFRESH_TOKEN_BYTES: usize = 32;

/// Issues and validates session tokens
///
/// Signing keys are derived once from the injected secret and never change
/// for the lifetime of the service.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiration: i64,
    refresh_token_expiration: i64,
}

impl TokenIssuer {
    /// Create an issuer from configuration
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        // HS256 needs real key material, not a placeholder string
        if config.jwt_secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_token_expiration: config.access_token_expiration,
            refresh_token_expiration: config.refresh_token_expiration,
        })
    }

    /// Issue a signed access token for a user
    pub fn issue_access(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = now + Duration::seconds(self.access_token_expiration);

        let claims = AccessTokenClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AuthError::Signing
        })
    }

    /// Issue an opaque refresh token
    ///
    /// 32 bytes from the OS-seeded thread RNG, URL-safe base64 encoded.
    /// The value carries no user data; the session row is the only link
    /// back to an account.
    pub fn issue_refresh(&self) -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Validate an access token and return its claims
    pub fn parse_access(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        // Validation::new pins HS256; a token signed with any other
        // algorithm is rejected regardless of its header.
        let data = decode::<AccessTokenClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(data.claims)
    }

    /// Access token lifetime in seconds
    pub fn access_token_expiration(&self) -> i64 {
        self.access_token_expiration
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_token_expiration(&self) -> i64 {
        self.refresh_token_expiration
    }

    /// Expiry timestamp for a refresh session created now
    pub fn refresh_expires_at(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.refresh_token_expiration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test_secret_key_32_characters_long!";

    fn test_issuer() -> TokenIssuer {
        let config = AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            access_token_expiration: 900,
            refresh_token_expiration: 604800,
            argon2_memory_cost: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            min_password_length: 8,
        };
        TokenIssuer::new(&config).unwrap()
    }

    #[test]
    fn test_short_secret_rejected() {
        let config = AuthConfig {
            jwt_secret: "short".to_string(),
            access_token_expiration: 900,
            refresh_token_expiration: 604800,
            argon2_memory_cost: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            min_password_length: 8,
        };
        assert!(TokenIssuer::new(&config).is_err());
    }

    #[test]
    fn test_access_token_round_trip() {
        let issuer = test_issuer();
        let user_id = Uuid::new_v4();

        let token = issuer.issue_access(user_id).unwrap();
        let claims = issuer.parse_access(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_expired_access_token_rejected() {
        let issuer = test_issuer();
        let now = Utc::now().timestamp();

        // Expired well past the default 60s decode leeway
        let claims = AccessTokenClaims {
            sub: Uuid::new_v4(),
            iat: now - 1000,
            exp: now - 120,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let err = issuer.parse_access(&token).unwrap_err();
        assert!(matches!(err, AuthError::ExpiredToken));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let issuer = test_issuer();

        let mut token = issuer.issue_access(Uuid::new_v4()).unwrap();
        // 'A' and 'E' are both valid final base64url chars, so the token
        // stays decodable and only the signature check can fail
        let last = token.pop().unwrap();
        token.push(if last == 'A' { 'E' } else { 'A' });

        let err = issuer.parse_access(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_wrong_algorithm_rejected() {
        let issuer = test_issuer();
        let now = Utc::now().timestamp();

        let claims = AccessTokenClaims {
            sub: Uuid::new_v4(),
            iat: now,
            exp: now + 900,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        // Same secret, wrong algorithm: must not validate
        let err = issuer.parse_access(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let issuer = test_issuer();

        for garbage in ["", "not-a-token", "a.b.c", "a.b"] {
            let err = issuer.parse_access(garbage).unwrap_err();
            assert!(matches!(err, AuthError::MalformedToken), "input: {garbage:?}");
        }
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let issuer = test_issuer();
        let now = Utc::now().timestamp();

        let claims = AccessTokenClaims {
            sub: Uuid::new_v4(),
            iat: now,
            exp: now + 900,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"a_completely_different_32b_secret!!"),
        )
        .unwrap();

        let err = issuer.parse_access(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_refresh_tokens_are_opaque_and_unique() {
        let issuer = test_issuer();

        let t1 = issuer.issue_refresh();
        let t2 = issuer.issue_refresh();

        assert_ne!(t1, t2);
        // 32 bytes -> 43 chars of unpadded URL-safe base64
        assert_eq!(t1.len(), 43);
        assert_eq!(URL_SAFE_NO_PAD.decode(&t1).unwrap().len(), 32);
        // Opaque: must not even parse as a JWT
        assert!(issuer.parse_access(&t1).is_err());
    }
}
