//! Operator authentication.
//!
//! A single operator is configured by email and argon2 password hash.
//! Successful logins receive an HS256 session token.

use std::sync::Arc;

use shared::crypto::email_fingerprint;
use shared::jwt::{IssuedSession, JwtError, SessionKeys};
use shared::password::{verify_password, PasswordError};
use shared::validation::normalize_email;
use tracing::{info, warn};

use crate::config::AdminConfig;

#[derive(Debug, thiserror::Error)]
pub enum AdminAuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password verification failed: {0}")]
    Password(#[from] PasswordError),

    #[error("Session error: {0}")]
    Session(#[from] JwtError),
}

pub struct AdminAuthenticator {
    email: String,
    password_hash: String,
    sessions: Arc<SessionKeys>,
}

impl AdminAuthenticator {
    pub fn new(config: &AdminConfig, sessions: Arc<SessionKeys>) -> Self {
        Self {
            email: normalize_email(&config.email),
            password_hash: config.password_hash.clone(),
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionKeys {
        &self.sessions
    }

    /// Checks operator credentials and issues a session.
    ///
    /// The password is verified even when the email does not match.
    pub fn login(&self, email: &str, password: &str) -> Result<IssuedSession, AdminAuthError> {
        let email = normalize_email(email);
        let password_ok = verify_password(password, &self.password_hash)?;

        if !password_ok || email != self.email {
            warn!(email = %email_fingerprint(&email), "Admin login rejected");
            return Err(AdminAuthError::InvalidCredentials);
        }

        let session = self.sessions.issue(&self.email)?;
        info!(session_id = %session.claims.jti, "Admin session issued");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::password::hash_password;

    fn authenticator() -> AdminAuthenticator {
        let config = AdminConfig {
            email: "Admin@Example.com".to_string(),
            password_hash: hash_password("correct horse").unwrap(),
            session_secret: "test_session_secret_at_least_32_bytes_long".to_string(),
            session_expiry_secs: 600,
            leeway_secs: 0,
        };
        let keys = SessionKeys::new(&config.session_secret, 600, 0).unwrap();
        AdminAuthenticator::new(&config, Arc::new(keys))
    }

    #[test]
    fn test_login_issues_verifiable_session() {
        let auth = authenticator();
        let session = auth.login("admin@example.com", "correct horse").unwrap();

        let claims = auth.sessions().verify(&session.token).unwrap();
        assert_eq!(claims.sub, "admin@example.com");
    }

    #[test]
    fn test_login_normalizes_email() {
        let auth = authenticator();
        assert!(auth.login("  ADMIN@example.COM ", "correct horse").is_ok());
    }

    #[test]
    fn test_wrong_password_rejected() {
        let auth = authenticator();
        assert!(matches!(
            auth.login("admin@example.com", "battery staple"),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_wrong_email_rejected() {
        let auth = authenticator();
        assert!(matches!(
            auth.login("someone@example.com", "correct horse"),
            Err(AdminAuthError::InvalidCredentials)
        ));
    }
}
