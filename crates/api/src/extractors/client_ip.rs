//! Client identity for rate limiting.

use std::net::SocketAddr;

use axum::{extract::ConnectInfo, http::Request};

/// Key identifying the caller for rate limiting.
///
/// The peer address is used unless `trust_forwarded_for` is set, in which
/// case the first `X-Forwarded-For` hop wins. Only enable that behind a
/// proxy that overwrites the header; otherwise callers can pick their own key.
pub fn client_key<B>(req: &Request<B>, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(hop) = forwarded {
            return hop.to_string();
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
