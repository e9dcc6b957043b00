use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifetime of an access token when none is configured.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiration timestamp (seconds since epoch, UTC).
    pub exp: i64,
    /// Issue timestamp (seconds since epoch, UTC).
    #[serde(default)]
    pub iat: i64,
}

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The expiry instant has passed.
    Expired,
    /// The signature does not verify under the service key.
    BadSignature,
    /// Not a decodable HS256 token.
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    InvalidToken(InvalidReason),
    /// The token verified but carries no usable subject.
    MissingSubject,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::InvalidToken(InvalidReason::Expired) => write!(f, "token expired"),
            TokenError::InvalidToken(InvalidReason::BadSignature) => {
                write!(f, "token signature mismatch")
            }
            TokenError::InvalidToken(InvalidReason::Malformed) => write!(f, "malformed token"),
            TokenError::MissingSubject => write!(f, "token has no subject"),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> TokenError {
        let reason = match error.kind() {
            ErrorKind::ExpiredSignature => InvalidReason::Expired,
            ErrorKind::InvalidSignature => InvalidReason::BadSignature,
            _ => InvalidReason::Malformed,
        };
        TokenError::InvalidToken(reason)
    }
}

/// Issues and verifies HS256 access tokens.
///
/// The key is fixed when the service is built and shared read-only by every request.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, default_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Signs a token for `subject` that expires `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?;

        let claims = Claims {
            sub: Some(subject.to_string()),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Signs a token with the configured default lifetime.
    pub fn access_token(&self, subject: &str) -> Result<String, AppError> {
        self.issue(subject, self.default_ttl)
    }

    /// Checks signature and expiry and returns the subject.
    ///
    /// A token is live only while its expiry is strictly in the future.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        // jsonwebtoken still accepts `exp == now`.
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::InvalidToken(InvalidReason::Expired));
        }
        match data.claims.sub {
            Some(sub) if !sub.is_empty() => Ok(sub),
            _ => Err(TokenError::MissingSubject),
        }
    }
}
