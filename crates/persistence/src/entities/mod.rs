//! Entity definitions (database row mappings).

pub mod allowed_email;
pub mod submission;

pub use allowed_email::AllowedEmailEntity;
pub use submission::EmailSubmissionEntity;
