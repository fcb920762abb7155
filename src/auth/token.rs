//! Signed, time-boxed bearer tokens (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::models::{DbUser, UserRole};
use crate::error::CmsError;

/// Claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: Uuid,
    pub username: String,
    pub role: UserRole,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Issues and validates bearer tokens with a fixed per-process lifetime.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Arc<String>,
    ttl_hours: u64,
}

impl TokenIssuer {
    pub fn new(secret: String, ttl_hours: u64) -> Self {
        Self {
            secret: Arc::new(secret),
            ttl_hours,
        }
    }

    /// Issue a signed token binding the user's identity and role.
    pub fn issue(&self, user: &DbUser) -> Result<String, CmsError> {
        let ttl_hours = i64::try_from(self.ttl_hours).unwrap_or(i64::MAX);
        self.issue_with_lifetime(user, Duration::hours(ttl_hours))
    }

    fn issue_with_lifetime(&self, user: &DbUser, lifetime: Duration) -> Result<String, CmsError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Check signature and expiry; returns the claims on success.
    ///
    /// Zero leeway: a token is rejected the second it expires.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.validate_exp = true;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user(role: UserRole) -> DbUser {
        DbUser {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            email: "tester@example.com".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            role,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let issuer = TokenIssuer::new("test-secret-at-least-32-chars-long!!".to_string(), 24);
        let user = test_user(UserRole::Admin);

        let token = issuer.issue(&user).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "tester");
        assert_eq!(claims.role, UserRole::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_foreign_signature() {
        let issuer = TokenIssuer::new("secret-a-secret-a-secret-a-secret-a".to_string(), 24);
        let other = TokenIssuer::new("secret-b-secret-b-secret-b-secret-b".to_string(), 24);
        let token = issuer.issue(&test_user(UserRole::User)).unwrap();

        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let issuer = TokenIssuer::new("test-secret-at-least-32-chars-long!!".to_string(), 24);
        let token = issuer
            .issue_with_lifetime(&test_user(UserRole::Admin), Duration::seconds(-30))
            .unwrap();

        let err = issuer.verify(&token).unwrap_err();
        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ));
    }

    #[test]
    fn verify_rejects_garbage() {
        let issuer = TokenIssuer::new("test-secret-at-least-32-chars-long!!".to_string(), 24);
        assert!(issuer.verify("not-a-token").is_err());
    }
}
