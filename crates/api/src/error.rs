use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::{AllowListError, SpinError, StoreError};
use serde::Serialize;
use shared::pagination::CursorError;
use thiserror::Error;

use crate::services::admin_auth::AdminAuthError;

/// Shown to visitors when the store cannot be reached.
pub const STORE_UNAVAILABLE_MESSAGE: &str =
    "We could not process your request right now. Please try again or contact admin.";

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!("Store failure: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service_unavailable",
                    STORE_UNAVAILABLE_MESSAGE.into(),
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::ServiceUnavailable(err.to_string())
    }
}

impl From<SpinError> for ApiError {
    fn from(err: SpinError) -> Self {
        match err {
            SpinError::InvalidEmail => ApiError::Validation(INVALID_EMAIL_MESSAGE.into()),
            SpinError::InvalidPrize => ApiError::Validation("Invalid prize".into()),
            SpinError::AlreadyClaimed => ApiError::Conflict(err.to_string()),
            SpinError::NotAuthorized => ApiError::Forbidden(err.to_string()),
            SpinError::Persistence(e) => e.into(),
        }
    }
}

impl From<AllowListError> for ApiError {
    fn from(err: AllowListError) -> Self {
        match err {
            AllowListError::InvalidEmail => ApiError::Validation(INVALID_EMAIL_MESSAGE.into()),
            AllowListError::NoValidEmails => ApiError::Validation(err.to_string()),
            AllowListError::Persistence(e) => e.into(),
        }
    }
}

impl From<AdminAuthError> for ApiError {
    fn from(err: AdminAuthError) -> Self {
        match err {
            AdminAuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".into())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CursorError> for ApiError {
    fn from(_: CursorError) -> Self {
        ApiError::Validation("Invalid cursor".into())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect();

        let message = if messages.len() == 1 {
            messages[0].clone()
        } else {
            format!("{} validation errors", messages.len())
        };

        ApiError::Validation(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_already_claimed_maps_to_conflict() {
        let response = ApiError::from(SpinError::AlreadyClaimed).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["error"], "conflict");
        assert_eq!(body["message"], "You have already claimed a prize.");
    }

    #[tokio::test]
    async fn test_not_authorized_maps_to_forbidden() {
        let response = ApiError::from(SpinError::NotAuthorized).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = body_json(response).await;
        assert_eq!(
            body["message"],
            "This email is not authorized to spin. Please contact admin."
        );
    }

    #[tokio::test]
    async fn test_store_failure_hides_detail() {
        let err = SpinError::Persistence(StoreError::Database(
            "relation \"email_submissions\" does not exist".into(),
        ));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["error"], "service_unavailable");
        assert_eq!(body["message"], STORE_UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        for err in [
            ApiError::from(SpinError::InvalidEmail),
            ApiError::from(SpinError::InvalidPrize),
            ApiError::from(AllowListError::NoValidEmails),
            ApiError::from(CursorError::InvalidFormat),
        ] {
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_bad_credentials_map_to_unauthorized() {
        let response = ApiError::from(AdminAuthError::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_rate_limited() {
        assert_eq!(
            ApiError::RateLimited.into_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::Unauthorized("test".to_string()).to_string(),
            "Unauthorized: test"
        );
        assert_eq!(
            ApiError::Validation("bad".to_string()).to_string(),
            "Validation error: bad"
        );
    }
}
