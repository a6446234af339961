//! Operator endpoints: login, allow-list administration, submission review.
//!
//! Everything except `login` sits behind `require_admin`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, TimeZone, Utc};
use domain::models::allowed_email::{
    AddAllowedEmailRequest, AddAllowedEmailResponse, BulkImportSummary, EmailListText,
    EmailPreview, ListAllowedEmailsQuery, ListAllowedEmailsResponse,
};
use domain::models::submission::{
    ListSubmissionsQuery, ListSubmissionsResponse, SubmissionSummary,
};
use serde::{Deserialize, Serialize};
use shared::pagination::{clamp_page_size, Cursor};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminSession;
use crate::middleware::metrics::record_allowed_emails_added;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 320, message = "email is required"))]
    pub email: String,

    #[validate(length(min = 1, max = 1024, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub email: String,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

/// POST /api/v1/admin/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let session = state.admin_auth.login(&request.email, &request.password)?;
    let expires_at = Utc
        .timestamp_opt(session.claims.exp, 0)
        .single()
        .ok_or_else(|| ApiError::Internal("session expiry out of range".into()))?;

    Ok(Json(LoginResponse {
        token: session.token,
        token_type: "Bearer",
        expires_at,
    }))
}

/// GET /api/v1/admin/session
pub async fn current_session(session: AdminSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        email: session.email,
        session_id: session.session_id,
        expires_at: session.expires_at,
    })
}

/// GET /api/v1/admin/allowed-emails
pub async fn list_allowed_emails(
    State(state): State<AppState>,
    Query(query): Query<ListAllowedEmailsQuery>,
) -> Result<Json<ListAllowedEmailsResponse>, ApiError> {
    let limit = clamp_page_size(query.limit);
    let offset = query.offset.unwrap_or(0).max(0);

    Ok(Json(state.allow_list.list(limit, offset).await?))
}

/// POST /api/v1/admin/allowed-emails
pub async fn add_allowed_email(
    State(state): State<AppState>,
    session: AdminSession,
    Json(request): Json<AddAllowedEmailRequest>,
) -> Result<(StatusCode, Json<AddAllowedEmailResponse>), ApiError> {
    request.validate()?;

    let response = state.allow_list.add_single(&request.email).await?;
    if response.added {
        record_allowed_emails_added("single", 1);
    }
    info!(operator = %session.session_id, added = response.added, "Allow-list add");

    let status = if response.added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(response)))
}

/// POST /api/v1/admin/allowed-emails/preview
pub async fn preview_allowed_emails(
    State(state): State<AppState>,
    Json(request): Json<EmailListText>,
) -> Result<Json<EmailPreview>, ApiError> {
    request.validate()?;
    Ok(Json(state.allow_list.preview(&request.text)))
}

/// POST /api/v1/admin/allowed-emails/bulk
pub async fn bulk_import_allowed_emails(
    State(state): State<AppState>,
    session: AdminSession,
    Json(request): Json<EmailListText>,
) -> Result<Json<BulkImportSummary>, ApiError> {
    request.validate()?;
    import_text(&state, &session, &request.text).await
}

/// POST /api/v1/admin/allowed-emails/import
///
/// Takes the raw contents of an uploaded `.csv` or text file as the body.
pub async fn import_allowed_emails_file(
    State(state): State<AppState>,
    session: AdminSession,
    body: String,
) -> Result<Json<BulkImportSummary>, ApiError> {
    import_text(&state, &session, &body).await
}

async fn import_text(
    state: &AppState,
    session: &AdminSession,
    text: &str,
) -> Result<Json<BulkImportSummary>, ApiError> {
    let summary = state.allow_list.bulk_import(text).await?;
    record_allowed_emails_added("bulk", summary.added);
    info!(
        operator = %session.session_id,
        found = summary.found,
        added = summary.added,
        "Allow-list import"
    );
    Ok(Json(summary))
}

/// GET /api/v1/admin/submissions
pub async fn list_submissions(
    State(state): State<AppState>,
    Query(query): Query<ListSubmissionsQuery>,
) -> Result<Json<ListSubmissionsResponse>, ApiError> {
    let limit = clamp_page_size(query.limit);
    let after = query.cursor.as_deref().map(Cursor::decode).transpose()?;

    // One extra row tells us whether another page exists.
    let mut rows = state.store.list_submissions(after, limit + 1).await?;
    let next_cursor = if rows.len() as i64 > limit {
        rows.truncate(limit as usize);
        rows.last()
            .map(|last| Cursor::new(last.created_at, last.id).encode())
    } else {
        None
    };

    Ok(Json(ListSubmissionsResponse {
        data: rows.iter().map(SubmissionSummary::from).collect(),
        next_cursor,
    }))
}
