//! Email submission repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::EmailSubmissionEntity;
use crate::metrics::QueryTimer;

/// Repository for email_submissions.
#[derive(Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<EmailSubmissionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_submission_by_email");
        let result = sqlx::query_as::<_, EmailSubmissionEntity>(
            r#"
            SELECT id, email, name, prize_won, created_at, updated_at
            FROM email_submissions
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Inserts or updates the row for `email` unless it is already claimed.
    ///
    /// Returns `None` when the existing row is claimed and was left untouched.
    pub async fn upsert_unclaimed(
        &self,
        email: &str,
        name: Option<&str>,
        prize_won: &str,
    ) -> Result<Option<EmailSubmissionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("upsert_submission");
        let result = sqlx::query_as::<_, EmailSubmissionEntity>(
            r#"
            INSERT INTO email_submissions (email, name, prize_won)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET
                name = COALESCE(EXCLUDED.name, email_submissions.name),
                prize_won = EXCLUDED.prize_won,
                updated_at = NOW()
            WHERE email_submissions.prize_won IN ('', 'pending')
            RETURNING id, email, name, prize_won, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(name)
        .bind(prize_won)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Newest first, keyset-paginated on `(created_at, id)`.
    pub async fn list(
        &self,
        after: Option<(DateTime<Utc>, i64)>,
        limit: i64,
    ) -> Result<Vec<EmailSubmissionEntity>, sqlx::Error> {
        let (after_created_at, after_id) = after.unzip();

        let timer = QueryTimer::new("list_submissions");
        let result = sqlx::query_as::<_, EmailSubmissionEntity>(
            r#"
            SELECT id, email, name, prize_won, created_at, updated_at
            FROM email_submissions
            WHERE $1::timestamptz IS NULL OR (created_at, id) < ($1, $2::bigint)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(after_created_at)
        .bind(after_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
