//! Signed bearer tokens identifying a logged in cashier.

use crate::user::UserId;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long a session token stays valid unless configured otherwise.
pub const DEFAULT_SESSION_DAYS: i64 = 30;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session has expired")]
    Expired,
    #[error("Invalid session token")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("Unable to sign session token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

#[derive(Serialize, Deserialize)]
struct SessionClaims {
    /// Cashier the session belongs to.
    sub: UserId,
    iat: i64,
    exp: i64,
}

/// HMAC keys used to issue and check session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl SessionKeys {
    pub fn from_secret(secret: &[u8]) -> SessionKeys {
        SessionKeys {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime: Duration::days(DEFAULT_SESSION_DAYS),
        }
    }

    pub fn with_lifetime(self, lifetime: Duration) -> SessionKeys {
        SessionKeys { lifetime, ..self }
    }

    pub fn issue(&self, cashier: UserId) -> Result<String, SessionError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: cashier,
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(SessionError::Signing)
    }

    /// Returns the cashier a token was issued to.
    pub fn verify(&self, token: &str) -> Result<UserId, SessionError> {
        match jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
        {
            Ok(data) => Ok(data.claims.sub),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(SessionError::Expired),
            Err(e) => Err(SessionError::Invalid(e)),
        }
    }
}
