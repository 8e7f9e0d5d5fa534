//! Bearer token verification.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use rolegate_core::UserId;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// The user id.
    pub sub: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token signature invalid")]
    InvalidSignature,

    #[error("token malformed: {0}")]
    Malformed(String),

    #[error("token subject invalid: {0}")]
    InvalidSubject(String),
}

/// Turns a bearer token into the authenticated user's id.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}

/// HMAC-SHA256 signed JWTs with a shared secret.
pub struct Hs256TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl TokenVerifier for Hs256TokenVerifier {
    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        UserId::new(data.claims.sub).map_err(|e| TokenError::InvalidSubject(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header};

    fn mint(secret: &str, sub: &str, ttl: Duration) -> String {
        let claims = AccessClaims {
            sub: sub.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
            iat: Some(Utc::now().timestamp()),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_subject() {
        let verifier = Hs256TokenVerifier::new(b"k");
        let user = verifier.verify(&mint("k", "alice", Duration::minutes(5))).unwrap();
        assert_eq!(user.as_str(), "alice");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let verifier = Hs256TokenVerifier::new(b"k");
        assert_eq!(
            verifier.verify(&mint("other", "alice", Duration::minutes(5))),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = Hs256TokenVerifier::new(b"k");
        assert_eq!(
            verifier.verify(&mint("k", "alice", Duration::hours(-1))),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn garbage_and_blank_subject_are_rejected() {
        let verifier = Hs256TokenVerifier::new(b"k");
        assert!(matches!(verifier.verify("not-a-jwt"), Err(TokenError::Malformed(_))));
        assert!(matches!(
            verifier.verify(&mint("k", " ", Duration::minutes(5))),
            Err(TokenError::InvalidSubject(_))
        ));
    }
}
