//! Allowed email entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the allowed_emails table.
#[derive(Debug, Clone, FromRow)]
pub struct AllowedEmailEntity {
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<AllowedEmailEntity> for domain::models::AllowedEmail {
    fn from(entity: AllowedEmailEntity) -> Self {
        Self {
            email: entity.email,
            created_at: entity.created_at,
        }
    }
}
