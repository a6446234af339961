//! Domain layer for the prize wheel backend.
//!
//! This crate contains:
//! - Domain models (submissions, allow-list entries, wheel segments)
//! - The persistence contract (`SubmissionStore`) and an in-memory store
//! - Business logic services: spin gate, allow-list administration, wheel

pub mod models;
pub mod services;
