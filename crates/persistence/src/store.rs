//! Postgres-backed [`SubmissionStore`].

use async_trait::async_trait;
use domain::models::{AllowedEmail, EmailSubmission};
use domain::services::{StoreError, SubmissionStore};
use shared::pagination::Cursor;
use sqlx::PgPool;

use crate::db;
use crate::repositories::{AllowedEmailRepository, SubmissionRepository};

/// Maps driver errors onto the store taxonomy.
///
/// Connection-level failures become `Unavailable`; everything else is a
/// `Database` error.
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        other => StoreError::Database(other.to_string()),
    }
}

#[derive(Clone)]
pub struct PgSubmissionStore {
    submissions: SubmissionRepository,
    allowed: AllowedEmailRepository,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            submissions: SubmissionRepository::new(pool.clone()),
            allowed: AllowedEmailRepository::new(pool),
        }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn find_submission_by_email(
        &self,
        email: &str,
    ) -> Result<Option<EmailSubmission>, StoreError> {
        let entity = self
            .submissions
            .find_by_email(email)
            .await
            .map_err(map_sqlx_error)?;
        Ok(entity.map(Into::into))
    }

    async fn upsert_submission(
        &self,
        email: &str,
        name: Option<&str>,
        prize_won: &str,
    ) -> Result<EmailSubmission, StoreError> {
        if let Some(entity) = self
            .submissions
            .upsert_unclaimed(email, name, prize_won)
            .await
            .map_err(map_sqlx_error)?
        {
            return Ok(entity.into());
        }

        // The conditional update skipped a claimed row; report it as stored.
        self.submissions
            .find_by_email(email)
            .await
            .map_err(map_sqlx_error)?
            .map(Into::into)
            .ok_or_else(|| StoreError::Database("submission vanished during upsert".to_string()))
    }

    async fn is_allowed(&self, email: &str) -> Result<bool, StoreError> {
        self.allowed.exists(email).await.map_err(map_sqlx_error)
    }

    async fn add_allowed(&self, email: &str) -> Result<bool, StoreError> {
        self.allowed.insert(email).await.map_err(map_sqlx_error)
    }

    async fn add_allowed_batch(&self, emails: &[String]) -> Result<u64, StoreError> {
        self.allowed
            .insert_batch(emails)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_allowed(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AllowedEmail>, i64), StoreError> {
        let entries = self
            .allowed
            .list(limit, offset)
            .await
            .map_err(map_sqlx_error)?;
        let total = self.allowed.count().await.map_err(map_sqlx_error)?;
        Ok((entries.into_iter().map(Into::into).collect(), total))
    }

    async fn list_submissions(
        &self,
        after: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<EmailSubmission>, StoreError> {
        let rows = self
            .submissions
            .list(after.map(|c| (c.created_at, c.id)), limit)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn health_check(&self) -> bool {
        db::ping(self.submissions.pool()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_unavailable() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolClosed),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn test_query_errors_are_database_errors() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }
}
