//! HS256 JWT issuing and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use satchel_core::AppError;
use uuid::Uuid;

use crate::auth::models::JwtClaims;

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Issue a token for `user_id` valid for `ttl`.
    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AppError> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-with-at-least-32-chars";

    #[test]
    fn test_issued_token_verifies() {
        let service = JwtService::new(SECRET);
        let user = Uuid::new_v4();
        let token = service.issue(user, Duration::minutes(5)).unwrap();
        assert_eq!(service.verify(&token).unwrap().sub, user);
    }

    #[test]
    fn test_foreign_and_expired_tokens_are_rejected() {
        let service = JwtService::new(SECRET);
        let other = JwtService::new("another-secret-that-is-long-enough-too");
        let token = other.issue(Uuid::new_v4(), Duration::minutes(5)).unwrap();
        assert!(matches!(
            service.verify(&token),
            Err(AppError::Unauthorized(_))
        ));

        let expired = service
            .issue(Uuid::new_v4(), Duration::minutes(-10))
            .unwrap();
        assert!(service.verify(&expired).is_err());
    }
}
