//! Persistence layer for the prize wheel backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - `PgSubmissionStore`, the Postgres-backed `SubmissionStore`

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use store::PgSubmissionStore;
