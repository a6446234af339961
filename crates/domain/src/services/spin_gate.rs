//! Spin gate: allow-list gating and the submission lifecycle.
//!
//! ```text
//! [no record] --request_spin(allowed)--> PENDING --claim_prize--> CLAIMED
//! PENDING --request_spin--> PENDING
//! CLAIMED --request_spin--> AlreadyClaimed
//! ```
//!
//! The store's conditional upsert is what keeps CLAIMED terminal when two
//! requests race; the gate only reports what the store returns.

use std::sync::Arc;
use std::time::Duration;

use shared::crypto::email_fingerprint;
use shared::validation::parse_email;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::submission::{ClaimOutcome, SpinTicket};
use crate::models::{promo_code_for, SpinResolution, SubmissionState, PENDING_PRIZE};
use crate::services::store::{StoreError, SubmissionStore};
use crate::services::wheel::Wheel;

/// Default number of claim write attempts.
pub const DEFAULT_CLAIM_ATTEMPTS: u32 = 3;

/// Default pause between claim write attempts.
pub const DEFAULT_CLAIM_RETRY_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum SpinError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("You have already claimed a prize.")]
    AlreadyClaimed,

    #[error("This email is not authorized to spin. Please contact admin.")]
    NotAuthorized,

    #[error("Invalid prize")]
    InvalidPrize,

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Campaign rules applied by the gate.
#[derive(Debug, Clone)]
pub struct GatePolicy {
    /// Add unknown emails to the allow-list instead of rejecting them.
    pub auto_approve: bool,
    pub claim_attempts: u32,
    pub claim_retry_delay: Duration,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            auto_approve: false,
            claim_attempts: DEFAULT_CLAIM_ATTEMPTS,
            claim_retry_delay: DEFAULT_CLAIM_RETRY_DELAY,
        }
    }
}

pub struct SpinGate {
    store: Arc<dyn SubmissionStore>,
    wheel: Wheel,
    policy: GatePolicy,
}

impl SpinGate {
    pub fn new(store: Arc<dyn SubmissionStore>, wheel: Wheel, policy: GatePolicy) -> Self {
        Self {
            store,
            wheel,
            policy,
        }
    }

    pub fn wheel(&self) -> &Wheel {
        &self.wheel
    }

    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    /// Decides whether `raw_email` may spin, leaving a pending submission
    /// behind when it may.
    pub async fn request_spin(
        &self,
        raw_email: &str,
        name: Option<&str>,
    ) -> Result<SpinTicket, SpinError> {
        let email = parse_email(raw_email).ok_or(SpinError::InvalidEmail)?;
        let fingerprint = email_fingerprint(&email);

        if let Some(existing) = self.store.find_submission_by_email(&email).await? {
            if existing.is_claimed() {
                info!(email = %fingerprint, "Spin refused, prize already claimed");
                return Err(SpinError::AlreadyClaimed);
            }
        }

        if !self.store.is_allowed(&email).await? {
            if !self.policy.auto_approve {
                info!(email = %fingerprint, "Spin refused, email not on allow-list");
                return Err(SpinError::NotAuthorized);
            }
            let added = self.store.add_allowed(&email).await?;
            info!(email = %fingerprint, added, "Email auto-approved");
        }

        let name = name.map(str::trim).filter(|n| !n.is_empty());
        let submission = self
            .store
            .upsert_submission(&email, name, PENDING_PRIZE)
            .await?;

        if submission.is_claimed() {
            info!(email = %fingerprint, "Spin refused, claim landed concurrently");
            return Err(SpinError::AlreadyClaimed);
        }

        info!(email = %fingerprint, submission_id = submission.id, "Wheel unlocked");
        Ok(SpinTicket {
            email,
            state: SubmissionState::Pending,
        })
    }

    /// Picks the outcome of a spin. No I/O.
    pub fn resolve_spin(&self) -> SpinResolution {
        self.wheel.resolve_spin()
    }

    /// Records `prize` for `raw_email`.
    ///
    /// Write failures are retried; if every attempt fails the outcome has
    /// `recorded: false` and no error is returned. A prize already stored
    /// for the email wins over the one passed in.
    pub async fn claim_prize(
        &self,
        raw_email: &str,
        prize: &str,
    ) -> Result<ClaimOutcome, SpinError> {
        let email = parse_email(raw_email).ok_or(SpinError::InvalidEmail)?;
        let prize = prize.trim();
        if prize.is_empty() || prize.eq_ignore_ascii_case(PENDING_PRIZE) {
            return Err(SpinError::InvalidPrize);
        }

        let fingerprint = email_fingerprint(&email);
        let attempts = self.policy.claim_attempts.max(1);

        for attempt in 1..=attempts {
            match self.store.upsert_submission(&email, None, prize).await {
                Ok(submission) => {
                    let stored = submission.prize_won;
                    if stored != prize {
                        warn!(
                            email = %fingerprint,
                            "Claim ignored, a different prize is already recorded"
                        );
                    } else {
                        info!(email = %fingerprint, prize, attempt, "Prize claimed");
                    }
                    return Ok(ClaimOutcome {
                        email,
                        promo_code: promo_code_for(&stored),
                        prize: stored,
                        recorded: true,
                    });
                }
                Err(e) => {
                    warn!(
                        email = %fingerprint,
                        attempt,
                        attempts,
                        error = %e,
                        "Failed to record prize claim"
                    );
                    if attempt < attempts {
                        tokio::time::sleep(self.policy.claim_retry_delay).await;
                    }
                }
            }
        }

        error!(
            email = %fingerprint,
            prize,
            attempts,
            "Prize claim not recorded after all attempts"
        );
        Ok(ClaimOutcome {
            email,
            prize: prize.to_string(),
            recorded: false,
            promo_code: promo_code_for(prize),
        })
    }
}
