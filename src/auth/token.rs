//! Session token service.
//!
//! Issues and validates the signed tokens carried in the auth cookie. Tokens
//! are stateless: validity is purely signature + expiry, there is no
//! server-side session table and no revocation. A logout therefore only
//! clears the client cookie; an already-captured token stays valid until its
//! natural expiry.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::User;

/// Fixed lifetime of a session token (and of the auth cookie)
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        // Zero leeway keeps the expiry boundary exact
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Issue a fresh token for a user, expiring [`TOKEN_TTL_DAYS`] from now
    pub fn issue(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let expires = now + Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode session token")
    }

    /// Validate a token and return its claims.
    ///
    /// Fails on a bad signature or a past expiry; callers get the same error
    /// either way and must not surface the distinction to clients.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .context("Invalid session token")?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User {
            id: "u-1".to_string(),
            email: "maria@padoca.test".to_string(),
            password_hash: String::new(),
            name: "Maria".to_string(),
            role: "admin".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_token_roundtrip() {
        let service = TokenService::new("test-secret");
        let user = test_user();

        let token = service.issue(&user).unwrap();
        let claims = service.validate(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.name, user.name);
        assert_eq!(claims.role, user.role);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new("test-secret");
        let now = Utc::now();

        // Correctly signed, but expired an hour ago
        let claims = Claims {
            sub: "u-1".to_string(),
            email: "maria@padoca.test".to_string(),
            name: "Maria".to_string(),
            role: "user".to_string(),
            iat: (now - Duration::days(8)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(service.validate(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = TokenService::new("test-secret");
        let other = TokenService::new("other-secret");
        let token = other.issue(&test_user()).unwrap();

        assert!(service.validate(&token).is_err());
    }
}
