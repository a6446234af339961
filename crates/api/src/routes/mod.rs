//! HTTP route handlers.

pub mod admin;
pub mod claims;
pub mod health;
pub mod spins;
pub mod wheel;
