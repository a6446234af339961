//! Custom Axum extractors.

pub mod admin_session;
pub mod client_ip;

pub use admin_session::AdminSession;
pub use client_ip::client_key;
