use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{AuthError, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, encoded as a string per RFC 7519
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Verified token contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub subject: i64,
    pub role: Role,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies HS256 bearer tokens with a fixed lifetime
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn issue(&self, subject: i64, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        self.sign(&claims)
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.keys.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            }
        })?;

        let subject = data.claims.sub.parse().map_err(|_| AuthError::Malformed)?;

        Ok(Identity {
            subject,
            role: data.claims.role,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.keys.encoding)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }
}
