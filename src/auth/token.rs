use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::user::Claims;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
}

/// Issues and verifies HS256 identity tokens carrying `{sub, iat, exp}`.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` against an explicit instant.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            ttl: config.token_ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenError::Invalid)?
            .claims;

        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig::new("test-secret"))
    }

    #[test]
    fn issued_token_verifies_to_subject() {
        let tokens = service();
        let user = Uuid::new_v4();

        let token = tokens.issue(user).unwrap();
        assert_eq!(tokens.verify(&token), Ok(user));
    }

    #[test]
    fn token_expires_after_ttl() {
        let tokens = service();
        let user = Uuid::new_v4();
        let issued = Utc::now();
        let token = tokens.issue_at(user, issued).unwrap();

        let edge = issued + tokens.ttl();
        assert_eq!(tokens.verify_at(&token, edge), Ok(user));
        assert_eq!(
            tokens.verify_at(&token, edge + Duration::seconds(1)),
            Err(TokenError::Expired)
        );
        assert_eq!(
            tokens.verify_at(&token, issued + Duration::hours(25)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn stale_token_is_expired_now() {
        let tokens = service();
        let token = tokens
            .issue_at(Uuid::new_v4(), Utc::now() - Duration::hours(25))
            .unwrap();
        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let tokens = service();
        let token = tokens.issue(Uuid::new_v4()).unwrap();

        // Flip one character in the middle of the payload segment.
        let payload_start = token.find('.').unwrap() + 1;
        let idx = payload_start + 10;
        let mut bytes = token.into_bytes();
        bytes[idx] = if bytes[idx] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(tokens.verify(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn other_secret_and_garbage_are_invalid() {
        let token = service().issue(Uuid::new_v4()).unwrap();
        let other = TokenService::new(&AuthConfig::new("rotated-secret"));

        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
        assert_eq!(service().verify("not-a-token"), Err(TokenError::Invalid));
        assert_eq!(service().verify(""), Err(TokenError::Invalid));
    }

    #[test]
    fn token_without_subject_is_invalid() {
        #[derive(serde::Serialize)]
        struct Partial {
            exp: i64,
            iat: i64,
        }
        let now = Utc::now().timestamp();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &Partial { exp: now + 60, iat: now },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(TokenError::Invalid));
    }
}
