//! Bearer token verification and generation.
//!
//! Tokens are issued by the identity provider with a shared HS256 secret;
//! this service only verifies them. `generate_token` exists for the
//! bootstrap tooling and the test suites.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::Role;

/// Claims carried by a verified bearer token.
///
/// `role` and `has_access` are snapshots taken at issuance; the database
/// remains authoritative for authorization decisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (opaque, stable user id)
    pub sub: String,
    /// Email, case-normalized by the issuer
    pub email: String,
    /// Role claim mirrored from the role record
    pub role: Role,
    /// Access flag mirrored from the subscription record
    pub has_access: bool,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Token duration: 1 hour
pub const TOKEN_DURATION_SECS: u64 = 60 * 60;

/// Configuration for JWT operations.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Generate a bearer token for a user.
    pub fn generate_token(
        &self,
        sub: &str,
        email: &str,
        role: Role,
        has_access: bool,
    ) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| JwtError::TimeError)?
            .as_secs();

        let claims = AccessClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            role,
            has_access,
            iat: now,
            exp: now + TOKEN_DURATION_SECS,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)
    }

    /// Validate and decode a bearer token.
    pub fn verify_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(JwtError::Decoding)?;

        Ok(token_data.claims)
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Error decoding the token
    Decoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Decoding(e) => write!(f, "Failed to decode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for JwtError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_verify_token() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let token = config
            .generate_token("uid-123", "alice@example.com", Role::Customer, true)
            .unwrap();

        let claims = config.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "uid-123");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, Role::Customer);
        assert!(claims.has_access);
        assert_eq!(claims.exp, claims.iat + TOKEN_DURATION_SECS);
    }

    #[test]
    fn test_admin_role_in_token() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let token = config
            .generate_token("uid-456", "admin@example.com", Role::Admin, false)
            .unwrap();

        let claims = config.verify_token(&token).unwrap();
        assert_eq!(claims.role, Role::Admin);
        assert!(!claims.has_access);
    }

    #[test]
    fn test_invalid_token() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        assert!(config.verify_token("invalid-token").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let config1 = JwtConfig::new(b"secret-1");
        let config2 = JwtConfig::new(b"secret-2");

        let token = config1
            .generate_token("uid-123", "alice@example.com", Role::Customer, true)
            .unwrap();

        assert!(config2.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        use std::time::{SystemTime, UNIX_EPOCH};

        let secret = b"test-secret";
        let encoding_key = jsonwebtoken::EncodingKey::from_secret(secret);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        // Create claims with exp in the past
        let claims = AccessClaims {
            sub: "uid-123".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::Customer,
            has_access: true,
            iat: now - 100,
            exp: now - 50, // Expired 50 seconds ago
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &encoding_key).unwrap();

        let config = JwtConfig::new(secret);
        assert!(config.verify_token(&token).is_err());
    }
}
