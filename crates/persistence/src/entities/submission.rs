//! Email submission entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the email_submissions table.
#[derive(Debug, Clone, FromRow)]
pub struct EmailSubmissionEntity {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub prize_won: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EmailSubmissionEntity> for domain::models::EmailSubmission {
    fn from(entity: EmailSubmissionEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            name: entity.name,
            prize_won: entity.prize_won,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain() {
        let now = Utc::now();
        let entity = EmailSubmissionEntity {
            id: 7,
            email: "a@example.com".to_string(),
            name: None,
            prize_won: "pending".to_string(),
            created_at: now,
            updated_at: now,
        };

        let submission: domain::models::EmailSubmission = entity.into();
        assert_eq!(submission.id, 7);
        assert!(!submission.is_claimed());
    }
}
