//! Admin session middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::admin_session::{bearer_token, AdminSession};

/// Rejects requests without a valid admin session token.
///
/// Expects `Authorization: Bearer <token>`. On success the [`AdminSession`]
/// is stored in request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
    {
        Some(token) => token.to_string(),
        None => {
            return ApiError::Unauthorized("Missing or malformed Authorization header".into())
                .into_response();
        }
    };

    match state.sessions.verify(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(AdminSession::from(claims));
            next.run(req).await
        }
        Err(e) => {
            debug!(error = %e, "Admin session rejected");
            ApiError::Unauthorized("Invalid or expired session".into()).into_response()
        }
    }
}
