//! Application services that sit between routes and the domain.

pub mod admin_auth;

pub use admin_auth::{AdminAuthError, AdminAuthenticator};
