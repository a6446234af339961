//! Prize claim endpoint.

use axum::{extract::State, Json};
use domain::models::submission::{ClaimOutcome, ClaimRequest};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_prize_claim;

/// POST /api/v1/claims
///
/// Answers 200 even when the claim could not be stored; `recorded` tells
/// the caller which happened.
pub async fn claim_prize(
    State(state): State<AppState>,
    Json(request): Json<ClaimRequest>,
) -> Result<Json<ClaimOutcome>, ApiError> {
    request.validate()?;

    let outcome = state
        .gate
        .claim_prize(&request.email, &request.prize)
        .await?;
    record_prize_claim(outcome.recorded);

    Ok(Json(outcome))
}
