//! Spin endpoints: unlock the wheel for an email and resolve an outcome.

use axum::{extract::State, Json};
use domain::models::submission::{SpinRequest, SpinTicket};
use domain::models::SpinResolution;
use domain::services::SpinError;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_spin_request;

/// POST /api/v1/spins
pub async fn request_spin(
    State(state): State<AppState>,
    Json(request): Json<SpinRequest>,
) -> Result<Json<SpinTicket>, ApiError> {
    request.validate()?;

    let result = state
        .gate
        .request_spin(&request.email, request.name.as_deref())
        .await;

    record_spin_request(match &result {
        Ok(_) => "unlocked",
        Err(SpinError::AlreadyClaimed) => "already_claimed",
        Err(SpinError::NotAuthorized) => "not_authorized",
        Err(SpinError::InvalidEmail) => "invalid_email",
        Err(_) => "error",
    });

    Ok(Json(result?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSpinRequest {
    /// Current absolute rotation of the rendered wheel, in degrees.
    pub previous_rotation: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSpinResponse {
    #[serde(flatten)]
    pub resolution: SpinResolution,
    /// Absolute rotation to animate to from `previousRotation`.
    pub target_rotation: f64,
}

/// POST /api/v1/spins/resolve
pub async fn resolve_spin(
    State(state): State<AppState>,
    request: Option<Json<ResolveSpinRequest>>,
) -> Json<ResolveSpinResponse> {
    let previous = request
        .and_then(|Json(r)| r.previous_rotation)
        .filter(|r| r.is_finite())
        .unwrap_or(0.0);

    let resolution = state.gate.resolve_spin();
    let target_rotation = resolution.continue_from(previous);

    Json(ResolveSpinResponse {
        resolution,
        target_rotation,
    })
}
