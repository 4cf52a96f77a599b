//! Session tokens. Logging in produces a signed JWT with a fixed 24-hour
//! expiry; possession of an [`AdminGrant`] is the compile-time proof that a
//! request presented a valid, unexpired token.

use crate::admin;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("missing or invalid bearer token")]
pub struct AccessDenied;

/// Tokens expire 24 hours after issuance; there is no refresh mechanism.
const TOKEN_TTL_HOURS: i64 = 24;

/// Signing and verification keys derived from the configured secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub(crate) fn issue(&self, admin: &admin::Admin) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: admin.id.0,
            username: admin.username.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding).unwrap()
    }

    pub(crate) fn verify(&self, token: &str) -> Result<AdminGrant, AccessDenied> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AccessDenied)?;
        Ok(AdminGrant {
            admin_id: admin::Id(data.claims.sub),
            username: data.claims.username,
        })
    }
}

/// This grant represents a compile-time proof that the caller holds a valid
/// session token.
#[derive(Debug)]
pub struct AdminGrant {
    pub admin_id: admin::Id,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    username: String,
    iat: i64,
    exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_admin() -> admin::Admin {
        admin::Admin {
            id: admin::Id(Uuid::from_u128(7)),
            username: "admin".to_owned(),
            password_hash: String::new(),
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let keys = TokenKeys::new("test-secret");
        let token = keys.issue(&test_admin());
        let grant = keys.verify(&token).unwrap();
        assert_eq!(grant.admin_id, admin::Id(Uuid::from_u128(7)));
        assert_eq!(grant.username, "admin");
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = TokenKeys::new("secret-a").issue(&test_admin());
        assert!(TokenKeys::new("secret-b").verify(&token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let keys = TokenKeys::new("test-secret");
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::from_u128(7),
            username: "admin".to_owned(),
            iat: (now - Duration::hours(25)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        let keys = TokenKeys::new("test-secret");
        assert!(keys.verify("not-a-token").is_err());
        assert!(keys.verify("").is_err());
    }
}
