//! Per-client rate limiting for public endpoints.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::{Clock, DefaultClock},
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter,
};
use serde_json::json;
use std::num::NonZeroU32;
use tracing::warn;

use crate::app::AppState;
use crate::extractors::client_key;

type ClientRateLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Shared limiter keyed by client address.
pub struct RateLimiterState {
    limiter: ClientRateLimiter,
    clock: DefaultClock,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Returns `None` when `rate_limit_per_minute` is 0 (disabled).
    pub fn new(rate_limit_per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(rate_limit_per_minute)?;
        Some(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            clock: DefaultClock::default(),
            rate_limit_per_minute,
        })
    }

    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Ok if allowed, otherwise the number of seconds to wait (at least 1).
    pub fn check(&self, client: &str) -> Result<(), u64> {
        self.limiter
            .check_key(&client.to_string())
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()).as_secs().max(1))
    }

    /// Drops state for clients that have fully replenished their quota.
    pub fn prune(&self) {
        self.limiter.retain_recent();
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

/// Applies the per-client limit; passes through when limiting is disabled.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(ref limiter) = state.rate_limiter {
        let client = client_key(&req, state.config.security.trust_forwarded_for);
        if let Err(retry_after) = limiter.check(&client) {
            warn!(path = %req.uri().path(), retry_after, "Rate limit exceeded");
            return rate_limited_response(limiter.rate_limit_per_minute(), retry_after);
        }
    }

    next.run(req).await
}

fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "error": "rate_limited",
        "message": format!("Rate limit of {} requests/minute exceeded", limit),
        "retryAfter": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}
