use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

const ACCESS_TOKEN_HOURS: i64 = 12;

/// Claims inside an access token (short-lived, stateless).
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
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

    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(ACCESS_TOKEN_HOURS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("token signing failed: {e}")))
    }

    /// Validates signature and expiry, returning the subject user id.
    /// Any failure maps to `AuthenticationRequired`; the caller decides
    /// whether that is fatal for the route.
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        let data = decode::<AccessClaims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AppError::AuthenticationRequired)?;
        Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::AuthenticationRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify_roundtrip() {
        let keys = TokenKeys::new("test-secret");
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id).unwrap();
        assert_eq!(keys.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = TokenKeys::new("secret-a").issue(Uuid::new_v4()).unwrap();
        let err = TokenKeys::new("secret-b").verify(&token).unwrap_err();
        assert!(matches!(err, AppError::AuthenticationRequired));
    }

    #[test]
    fn expired_token_rejected() {
        let keys = TokenKeys::new("test-secret");
        let now = Utc::now();
        let claims = AccessClaims {
            sub: Uuid::new_v4().to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(
            keys.verify(&token).unwrap_err(),
            AppError::AuthenticationRequired
        ));
    }

    #[test]
    fn garbage_token_rejected() {
        let keys = TokenKeys::new("test-secret");
        assert!(keys.verify("not.a.jwt").is_err());
    }
}
