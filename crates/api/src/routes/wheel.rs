//! Wheel layout for rendering.

use axum::{extract::State, Json};
use domain::models::WheelSegment;
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelResponse {
    pub segments: Vec<WheelSegment>,
    pub segment_angle: f64,
}

pub async fn get_wheel(State(state): State<AppState>) -> Json<WheelResponse> {
    let wheel = state.gate.wheel();
    Json(WheelResponse {
        segments: wheel.segments().to_vec(),
        segment_angle: wheel.segment_angle(),
    })
}
