//! Domain models for the prize wheel.

pub mod allowed_email;
pub mod submission;
pub mod wheel;

pub use allowed_email::AllowedEmail;
pub use submission::{is_claimed_value, EmailSubmission, SubmissionState, PENDING_PRIZE};
pub use wheel::{default_segments, promo_code_for, SpinResolution, WheelSegment};
