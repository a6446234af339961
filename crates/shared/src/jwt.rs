//! Admin session tokens (HS256 JWT).
//!
//! Sessions are issued after the operator's credentials are verified and are
//! checked on every admin request. Nothing is kept client-side beyond the
//! signed token itself, and every token expires.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Minimum secret length accepted for HMAC signing.
pub const MIN_SECRET_LEN: usize = 32;

/// Default leeway in seconds for clock skew tolerance.
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Audience claim stamped on every admin session.
pub const ADMIN_AUDIENCE: &str = "prize-wheel-admin";

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Claims carried by an admin session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Operator email.
    pub sub: String,
    /// Audience, always [`ADMIN_AUDIENCE`].
    pub aud: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Unique token identifier
    pub jti: String,
}

/// A freshly issued session token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub claims: SessionClaims,
}

/// Signing and verification keys for admin sessions.
#[derive(Clone)]
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    pub expiry_secs: i64,
    pub leeway_secs: u64,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("expiry_secs", &self.expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl SessionKeys {
    /// Creates keys from a shared secret.
    ///
    /// Secrets shorter than [`MIN_SECRET_LEN`] bytes are rejected.
    pub fn new(secret: &str, expiry_secs: i64, leeway_secs: u64) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtError::InvalidKey(format!(
                "session secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if expiry_secs <= 0 {
            return Err(JwtError::InvalidKey(
                "session expiry must be positive".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
            leeway_secs,
        })
    }

    /// Issues a session for the given operator.
    pub fn issue(&self, subject: &str) -> Result<IssuedSession, JwtError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: subject.to_string(),
            aud: ADMIN_AUDIENCE.to_string(),
            exp: (now + Duration::seconds(self.expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(IssuedSession { token, claims })
    }

    /// Verifies signature, audience and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;
        validation.set_audience(&[ADMIN_AUDIENCE]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}
