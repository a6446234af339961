//! Repository implementations for database operations.

pub mod allowed_email;
pub mod submission;

pub use allowed_email::AllowedEmailRepository;
pub use submission::SubmissionRepository;
