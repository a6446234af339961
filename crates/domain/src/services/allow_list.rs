//! Allow-list administration.

use std::sync::Arc;

use shared::crypto::email_fingerprint;
use shared::validation::{email_tokens, extract_emails, parse_email};
use thiserror::Error;
use tracing::info;

use crate::models::allowed_email::{
    AddAllowedEmailResponse, BulkImportSummary, EmailPreview, ListAllowedEmailsResponse,
};
use crate::services::store::{StoreError, SubmissionStore};

#[derive(Debug, Error)]
pub enum AllowListError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("No valid emails found")]
    NoValidEmails,

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

pub struct AllowListAdmin {
    store: Arc<dyn SubmissionStore>,
}

impl AllowListAdmin {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self { store }
    }

    /// Adds one email. The input must be exactly one token and that token a
    /// valid address; case variants of the same address still count as two.
    pub async fn add_single(&self, raw: &str) -> Result<AddAllowedEmailResponse, AllowListError> {
        let mut tokens = email_tokens(raw);
        let email = match (tokens.next(), tokens.next()) {
            (Some(token), None) => parse_email(token).ok_or(AllowListError::InvalidEmail)?,
            _ => return Err(AllowListError::InvalidEmail),
        };

        let added = self.store.add_allowed(&email).await?;
        info!(email = %email_fingerprint(&email), added, "Allow-list entry added");

        Ok(AddAllowedEmailResponse { email, added })
    }

    /// Lists the emails `bulk_import` would add, without writing.
    pub fn preview(&self, raw_text: &str) -> EmailPreview {
        EmailPreview::new(extract_emails(raw_text))
    }

    pub async fn bulk_import(&self, raw_text: &str) -> Result<BulkImportSummary, AllowListError> {
        let emails = extract_emails(raw_text);
        if emails.is_empty() {
            return Err(AllowListError::NoValidEmails);
        }

        let added = self.store.add_allowed_batch(&emails).await?;
        info!(found = emails.len(), added, "Allow-list bulk import completed");

        Ok(BulkImportSummary {
            found: emails.len(),
            added,
        })
    }

    pub async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<ListAllowedEmailsResponse, AllowListError> {
        let (data, total) = self.store.list_allowed(limit, offset).await?;
        Ok(ListAllowedEmailsResponse {
            data,
            total,
            limit,
            offset,
        })
    }
}
