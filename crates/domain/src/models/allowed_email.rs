//! Allow-list models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::validation::validate_email_address;

/// An email permitted to spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedEmail {
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Request to add one email to the allow-list.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddAllowedEmailRequest {
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAllowedEmailResponse {
    pub email: String,
    /// False when the email was already present.
    pub added: bool,
}

/// Free text holding any number of emails.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmailListText {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
}

/// Emails found in a piece of text, before anything is written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPreview {
    pub count: usize,
    pub emails: Vec<String>,
}

impl EmailPreview {
    pub fn new(emails: Vec<String>) -> Self {
        Self {
            count: emails.len(),
            emails,
        }
    }
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkImportSummary {
    /// Distinct valid emails found in the input.
    pub found: usize,
    /// Emails that were not already on the allow-list.
    pub added: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAllowedEmailsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAllowedEmailsResponse {
    pub data: Vec<AllowedEmail>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_request_validation() {
        let ok: AddAllowedEmailRequest =
            serde_json::from_value(json!({"email": " Guest@Example.com "})).unwrap();
        assert!(ok.validate().is_ok());

        let bad: AddAllowedEmailRequest =
            serde_json::from_value(json!({"email": "guest@localhost"})).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_email_list_text_rejects_empty() {
        let text: EmailListText = serde_json::from_value(json!({"text": ""})).unwrap();
        assert!(text.validate().is_err());
    }

    #[test]
    fn test_preview_counts_emails() {
        let preview = EmailPreview::new(vec!["a@x.io".into(), "b@x.io".into()]);
        assert_eq!(preview.count, 2);
        let json = serde_json::to_value(&preview).unwrap();
        assert_eq!(json["count"], 2);
        assert_eq!(json["emails"][1], "b@x.io");
    }

    #[test]
    fn test_bulk_import_summary_serialization() {
        let summary = BulkImportSummary { found: 3, added: 1 };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["found"], 3);
        assert_eq!(json["added"], 1);
    }
}
