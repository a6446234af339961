//! Admin session extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{DateTime, TimeZone, Utc};
use shared::jwt::SessionClaims;

use crate::app::AppState;
use crate::error::ApiError;

/// An authenticated operator session.
///
/// Inserted by the `require_admin` middleware; handlers behind it take this
/// as an argument.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub email: String,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionClaims> for AdminSession {
    fn from(claims: SessionClaims) -> Self {
        Self {
            email: claims.sub,
            session_id: claims.jti,
            expires_at: Utc
                .timestamp_opt(claims.exp, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }
}

/// Extracts a Bearer token from an `Authorization` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<AdminSession>() {
            return Ok(session.clone());
        }

        let token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| ApiError::Unauthorized("Missing or malformed Authorization header".into()))?;

        state
            .sessions
            .verify(token)
            .map(AdminSession::from)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired session".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("bearer abc"), None);
    }

    #[test]
    fn test_session_from_claims() {
        let claims = SessionClaims {
            sub: "admin@example.com".to_string(),
            aud: shared::jwt::ADMIN_AUDIENCE.to_string(),
            exp: 1_900_000_000,
            iat: 1_899_996_400,
            jti: "abc".to_string(),
        };
        let session = AdminSession::from(claims);
        assert_eq!(session.email, "admin@example.com");
        assert_eq!(session.session_id, "abc");
        assert_eq!(session.expires_at.timestamp(), 1_900_000_000);
    }
}
