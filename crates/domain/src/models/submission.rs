//! Email submission models.
//!
//! A submission is keyed by normalized email. Its lifecycle is carried by the
//! `prize_won` column: [`PENDING_PRIZE`] while the wheel is unlocked, the
//! prize label once claimed. Claimed rows are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sentinel stored in `prize_won` between spin approval and claim.
pub const PENDING_PRIZE: &str = "pending";

/// Returns true if a stored `prize_won` value represents a claimed prize.
pub fn is_claimed_value(prize_won: &str) -> bool {
    !prize_won.is_empty() && prize_won != PENDING_PRIZE
}

/// Lifecycle state derived from `prize_won`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    /// Eligible to spin, nothing claimed yet.
    Pending,
    /// A prize has been durably recorded.
    Claimed,
}

impl SubmissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
        }
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored email submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSubmission {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub prize_won: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmailSubmission {
    pub fn is_claimed(&self) -> bool {
        is_claimed_value(&self.prize_won)
    }

    /// Rows with an empty `prize_won` are treated as pending.
    pub fn state(&self) -> SubmissionState {
        if self.is_claimed() {
            SubmissionState::Claimed
        } else {
            SubmissionState::Pending
        }
    }

    pub fn claimed_prize(&self) -> Option<&str> {
        self.is_claimed().then_some(self.prize_won.as_str())
    }
}

/// Request to unlock the wheel for an email.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpinRequest {
    #[validate(length(min = 1, max = 320, message = "email must be 1-320 characters"))]
    pub email: String,

    #[validate(length(max = 200, message = "name must be at most 200 characters"))]
    pub name: Option<String>,
}

/// Returned when the gate lets an email through.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinTicket {
    pub email: String,
    pub state: SubmissionState,
}

/// Request to record the prize a spin produced.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    #[validate(length(min = 1, max = 320, message = "email must be 1-320 characters"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "prize must be 1-100 characters"))]
    pub prize: String,
}

/// Result of a claim.
///
/// `recorded` is false when every write attempt failed; the flow still
/// completes for the visitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimOutcome {
    pub email: String,
    pub prize: String,
    pub recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
}

/// Submission row as shown to operators.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub email: String,
    pub name: Option<String>,
    pub state: SubmissionState,
    pub prize: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&EmailSubmission> for SubmissionSummary {
    fn from(submission: &EmailSubmission) -> Self {
        Self {
            email: submission.email.clone(),
            name: submission.name.clone(),
            state: submission.state(),
            prize: submission.claimed_prize().map(str::to_string),
            created_at: submission.created_at,
            updated_at: submission.updated_at,
        }
    }
}

/// Query parameters for listing submissions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSubmissionsQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

/// A page of submissions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSubmissionsResponse {
    pub data: Vec<SubmissionSummary>,
    pub next_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(prize_won: &str) -> EmailSubmission {
        let now = Utc::now();
        EmailSubmission {
            id: 1,
            email: "a@example.com".to_string(),
            name: Some("Anonymous".to_string()),
            prize_won: prize_won.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_is_claimed_value() {
        assert!(!is_claimed_value(""));
        assert!(!is_claimed_value(PENDING_PRIZE));
        assert!(is_claimed_value("FREE RENT"));
    }

    #[test]
    fn test_state_derivation() {
        assert_eq!(submission("").state(), SubmissionState::Pending);
        assert_eq!(submission("pending").state(), SubmissionState::Pending);
        assert_eq!(submission("FREE RENT").state(), SubmissionState::Claimed);
    }

    #[test]
    fn test_claimed_prize() {
        assert_eq!(submission("pending").claimed_prize(), None);
        assert_eq!(submission("FREE RENT").claimed_prize(), Some("FREE RENT"));
    }

    #[test]
    fn test_summary_hides_pending_marker() {
        let summary = SubmissionSummary::from(&submission("pending"));
        assert_eq!(summary.state, SubmissionState::Pending);
        assert_eq!(summary.prize, None);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["state"], "pending");
        assert!(json["prize"].is_null());
    }

    #[test]
    fn test_spin_request_deserialize_and_validate() {
        let request: SpinRequest =
            serde_json::from_value(json!({"email": "a@example.com", "name": "Ann"})).unwrap();
        assert!(request.validate().is_ok());

        let request: SpinRequest = serde_json::from_value(json!({"email": ""})).unwrap();
        assert!(request.validate().is_err());
        assert!(request.name.is_none());
    }

    #[test]
    fn test_claim_request_requires_prize() {
        let request: ClaimRequest =
            serde_json::from_value(json!({"email": "a@example.com", "prize": ""})).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_claim_outcome_serialization() {
        let outcome = ClaimOutcome {
            email: "a@example.com".to_string(),
            prize: "FREE RENT".to_string(),
            recorded: true,
            promo_code: Some("FREERENT1".to_string()),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["promoCode"], "FREERENT1");
        assert_eq!(json["recorded"], true);

        let without = ClaimOutcome {
            promo_code: None,
            ..outcome
        };
        let json = serde_json::to_value(&without).unwrap();
        assert!(json.get("promoCode").is_none());
    }

    #[test]
    fn test_submission_state_display() {
        assert_eq!(SubmissionState::Pending.to_string(), "pending");
        assert_eq!(SubmissionState::Claimed.to_string(), "claimed");
    }
}
