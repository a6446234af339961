//! Persistence contract for submissions and the allow-list.
//!
//! The Postgres implementation lives in the `persistence` crate. The
//! in-memory store here backs tests and local runs, and can be told to fail
//! so retry and degradation paths are exercised without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use shared::pagination::Cursor;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{is_claimed_value, AllowedEmail, EmailSubmission};

/// Errors raised by a [`SubmissionStore`].
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Storage operations needed by the spin gate and allow-list admin.
///
/// Emails passed in are already normalized.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn find_submission_by_email(
        &self,
        email: &str,
    ) -> Result<Option<EmailSubmission>, StoreError>;

    /// Inserts or updates the row for `email`.
    ///
    /// A `None` name keeps whatever is stored. A claimed row is never
    /// modified; it is returned as-is so callers can detect the conflict.
    async fn upsert_submission(
        &self,
        email: &str,
        name: Option<&str>,
        prize_won: &str,
    ) -> Result<EmailSubmission, StoreError>;

    async fn is_allowed(&self, email: &str) -> Result<bool, StoreError>;

    /// Returns true if the email was not already present.
    async fn add_allowed(&self, email: &str) -> Result<bool, StoreError>;

    /// Returns the number of newly inserted emails.
    async fn add_allowed_batch(&self, emails: &[String]) -> Result<u64, StoreError>;

    /// Newest first, with the total row count.
    async fn list_allowed(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AllowedEmail>, i64), StoreError>;

    /// Newest first, starting strictly after `after`.
    async fn list_submissions(
        &self,
        after: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<EmailSubmission>, StoreError>;

    async fn health_check(&self) -> bool;
}

#[derive(Debug, Default)]
struct MemoryState {
    submissions: HashMap<String, EmailSubmission>,
    allowed: HashMap<String, AllowedEmail>,
    next_id: i64,
}

/// Timestamps at the precision Postgres keeps, so cursors compare equal.
fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Store backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
    failing_writes: AtomicU32,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose allow-list already holds `emails`.
    pub fn with_allowed<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = now_micros();
        let allowed = emails
            .into_iter()
            .map(|email| {
                let email = email.into();
                (
                    email.clone(),
                    AllowedEmail {
                        email,
                        created_at: now,
                    },
                )
            })
            .collect();

        Self {
            state: RwLock::new(MemoryState {
                allowed,
                ..MemoryState::default()
            }),
            ..Self::default()
        }
    }

    /// Makes the next `count` submission writes fail.
    pub fn fail_next_writes(&self, count: u32) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Makes every operation fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }

    fn take_write_failure(&self) -> bool {
        self.failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl SubmissionStore for InMemoryStore {
    async fn find_submission_by_email(
        &self,
        email: &str,
    ) -> Result<Option<EmailSubmission>, StoreError> {
        self.check_available()?;
        Ok(self.state.read().await.submissions.get(email).cloned())
    }

    async fn upsert_submission(
        &self,
        email: &str,
        name: Option<&str>,
        prize_won: &str,
    ) -> Result<EmailSubmission, StoreError> {
        self.check_available()?;
        if self.take_write_failure() {
            return Err(StoreError::Database("injected write failure".to_string()));
        }

        let mut state = self.state.write().await;
        let now = now_micros();

        if let Some(existing) = state.submissions.get_mut(email) {
            if !is_claimed_value(&existing.prize_won) {
                if let Some(name) = name {
                    existing.name = Some(name.to_string());
                }
                existing.prize_won = prize_won.to_string();
                existing.updated_at = now;
            }
            return Ok(existing.clone());
        }

        state.next_id += 1;
        let submission = EmailSubmission {
            id: state.next_id,
            email: email.to_string(),
            name: name.map(str::to_string),
            prize_won: prize_won.to_string(),
            created_at: now,
            updated_at: now,
        };
        state
            .submissions
            .insert(email.to_string(), submission.clone());
        Ok(submission)
    }

    async fn is_allowed(&self, email: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.state.read().await.allowed.contains_key(email))
    }

    async fn add_allowed(&self, email: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if state.allowed.contains_key(email) {
            return Ok(false);
        }
        state.allowed.insert(
            email.to_string(),
            AllowedEmail {
                email: email.to_string(),
                created_at: now_micros(),
            },
        );
        Ok(true)
    }

    async fn add_allowed_batch(&self, emails: &[String]) -> Result<u64, StoreError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let now = now_micros();
        let mut added = 0;
        for email in emails {
            if state.allowed.contains_key(email) {
                continue;
            }
            state.allowed.insert(
                email.clone(),
                AllowedEmail {
                    email: email.clone(),
                    created_at: now,
                },
            );
            added += 1;
        }
        Ok(added)
    }

    async fn list_allowed(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AllowedEmail>, i64), StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut entries: Vec<AllowedEmail> = state.allowed.values().cloned().collect();
        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.email.cmp(&b.email))
        });

        let total = entries.len() as i64;
        let page = entries
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_submissions(
        &self,
        after: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<EmailSubmission>, StoreError> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut rows: Vec<EmailSubmission> = state
            .submissions
            .values()
            .filter(|s| match &after {
                Some(cursor) => (s.created_at, s.id) < (cursor.created_at, cursor.id),
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn health_check(&self) -> bool {
        self.check_available().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PENDING_PRIZE;

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let store = InMemoryStore::new();

        let created = store
            .upsert_submission("a@example.com", Some("Ann"), PENDING_PRIZE)
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.prize_won, PENDING_PRIZE);

        let updated = store
            .upsert_submission("a@example.com", None, "FREE RENT")
            .await
            .unwrap();
        assert_eq!(updated.id, 1);
        assert_eq!(updated.name.as_deref(), Some("Ann"));
        assert_eq!(updated.prize_won, "FREE RENT");
    }

    #[tokio::test]
    async fn test_upsert_never_demotes_claimed_row() {
        let store = InMemoryStore::new();
        store
            .upsert_submission("a@example.com", None, "FREE RENT")
            .await
            .unwrap();

        let row = store
            .upsert_submission("a@example.com", Some("Other"), PENDING_PRIZE)
            .await
            .unwrap();
        assert_eq!(row.prize_won, "FREE RENT");
        assert_eq!(row.name, None);
    }

    #[tokio::test]
    async fn test_add_allowed_is_idempotent() {
        let store = InMemoryStore::new();
        assert!(store.add_allowed("a@example.com").await.unwrap());
        assert!(!store.add_allowed("a@example.com").await.unwrap());

        let (entries, total) = store.list_allowed(10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_add_allowed_batch_counts_new_rows() {
        let store = InMemoryStore::with_allowed(["a@example.com"]);
        let added = store
            .add_allowed_batch(&["a@example.com".to_string(), "b@example.com".to_string()])
            .await
            .unwrap();
        assert_eq!(added, 1);
        assert!(store.is_allowed("b@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_allowed_paging() {
        let store = InMemoryStore::with_allowed(["a@x.io", "b@x.io", "c@x.io"]);
        let (page, total) = store.list_allowed(2, 2).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn test_list_submissions_cursor() {
        let store = InMemoryStore::new();
        for email in ["a@x.io", "b@x.io", "c@x.io"] {
            store
                .upsert_submission(email, None, PENDING_PRIZE)
                .await
                .unwrap();
        }

        let first = store.list_submissions(None, 2).await.unwrap();
        assert_eq!(first.len(), 2);

        let last = &first[1];
        let cursor = Cursor::new(last.created_at, last.id);
        let second = store.list_submissions(Some(cursor), 2).await.unwrap();
        assert_eq!(second.len(), 1);
        assert!(first.iter().all(|s| s.id != second[0].id));
    }

    #[tokio::test]
    async fn test_injected_write_failures() {
        let store = InMemoryStore::new();
        store.fail_next_writes(2);

        assert!(store
            .upsert_submission("a@x.io", None, PENDING_PRIZE)
            .await
            .is_err());
        assert!(store
            .upsert_submission("a@x.io", None, PENDING_PRIZE)
            .await
            .is_err());
        assert!(store
            .upsert_submission("a@x.io", None, PENDING_PRIZE)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        assert!(!store.health_check().await);
        assert!(matches!(
            store.is_allowed("a@x.io").await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_unavailable(false);
        assert!(store.health_check().await);
    }
}
