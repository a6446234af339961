//! Shared utilities and common types for the prize wheel backend.
//!
//! This crate provides functionality used across all other crates:
//! - Email normalization and syntax validation
//! - Email fingerprinting for log output
//! - Password hashing with Argon2id
//! - Admin session tokens (HS256 JWT)
//! - Cursor pagination helpers

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
