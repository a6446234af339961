//! Allow-list repository.

use sqlx::PgPool;

use crate::entities::AllowedEmailEntity;
use crate::metrics::QueryTimer;

/// Repository for allowed_emails.
#[derive(Clone)]
pub struct AllowedEmailRepository {
    pool: PgPool,
}

impl AllowedEmailRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("is_email_allowed");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM allowed_emails WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Returns true if the row was inserted.
    pub async fn insert(&self, email: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("insert_allowed_email");
        let result = sqlx::query(
            r#"
            INSERT INTO allowed_emails (email)
            VALUES ($1)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(email)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() == 1)
    }

    /// Inserts all emails in one statement, returning how many were new.
    pub async fn insert_batch(&self, emails: &[String]) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("insert_allowed_emails_batch");
        let result = sqlx::query(
            r#"
            INSERT INTO allowed_emails (email)
            SELECT UNNEST($1::text[])
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(emails)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    pub async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AllowedEmailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_allowed_emails");
        let result = sqlx::query_as::<_, AllowedEmailEntity>(
            r#"
            SELECT email, created_at
            FROM allowed_emails
            ORDER BY created_at DESC, email ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_allowed_emails");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM allowed_emails")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }
}
