//! JWT token utilities for authentication and authorization.
//!
//! Provides session token creation, validation, and claims management for
//! user authentication.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::ServiceError;

/// JWT claims: the signed session identity.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Display name
    pub name: String,
    /// Account email, the primary identity
    pub email: String,
    /// Token expiration timestamp
    pub exp: usize,
    /// Token issued at timestamp
    pub iat: usize,
}

/// JWT token utility for creating and validating tokens.
///
/// Keys are derived once from the signing secret handed in at
/// construction; the expiry window comes from the same configuration.
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expires_in_seconds: u64,
}

impl JwtUtils {
    /// Create a new JwtUtils instance from application configuration
    pub fn new(config: &Config) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        JwtUtils {
            encoding_key,
            decoding_key,
            validation,
            expires_in_seconds: config.jwt_expires_in_seconds,
        }
    }

    /// Generate a new session token carrying the user's name and email
    pub fn generate_token(&self, name: String, email: String) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expires_in_seconds as i64);

        let claims = Claims {
            name,
            email,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal(format!("Token generation failed: {}", e)))
    }

    /// Validate and decode a session token
    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| ServiceError::unauthorized(format!("Token validation failed: {}", e)))
    }
}

impl Claims {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if token has expired
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as usize;
        now > self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str) -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 3,
            jwt_secret: secret.to_string(),
            jwt_expires_in_seconds: 3600,
            server_port: 0,
        }
    }

    #[test]
    fn token_round_trips_claims() {
        let jwt = JwtUtils::new(&test_config("test-secret"));
        let token = jwt
            .generate_token("Tarek Samy".to_string(), "test@test.com".to_string())
            .unwrap();

        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.email(), "test@test.com");
        assert_eq!(claims.name(), "Tarek Samy");
        assert!(!claims.is_expired());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let signer = JwtUtils::new(&test_config("secret-a"));
        let verifier = JwtUtils::new(&test_config("secret-b"));

        let token = signer
            .generate_token("Tarek Samy".to_string(), "test@test.com".to_string())
            .unwrap();

        assert!(matches!(
            verifier.validate_token(&token).unwrap_err(),
            ServiceError::Unauthorized { .. }
        ));
    }
}
