//! Wheel segment and spin result models.

use serde::{Deserialize, Serialize};

/// Full turns used when the front end asks for an absolute rotation.
const DEGREES_PER_TURN: f64 = 360.0;

/// One slice of the prize wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelSegment {
    pub id: u32,
    pub label: String,
    pub color: String,
    pub text_color: String,
    /// Only segments marked winnable can be selected by a spin.
    pub can_win: bool,
}

impl WheelSegment {
    pub fn new(id: u32, label: &str, color: &str, can_win: bool) -> Self {
        Self {
            id,
            label: label.to_string(),
            color: color.to_string(),
            text_color: "#FFFFFF".to_string(),
            can_win,
        }
    }
}

/// The campaign wheel: seven "FREE RENT" slices and one decorative
/// "1 YEAR FREE" slice that is never selected.
pub fn default_segments() -> Vec<WheelSegment> {
    const AMBER: &str = "#F59E0B";
    const TEAL: &str = "#0F766E";

    vec![
        WheelSegment::new(1, "FREE RENT", AMBER, true),
        WheelSegment::new(2, "FREE RENT", TEAL, true),
        WheelSegment::new(3, "FREE RENT", AMBER, true),
        WheelSegment::new(4, "1 YEAR FREE", TEAL, false),
        WheelSegment::new(5, "FREE RENT", AMBER, true),
        WheelSegment::new(6, "FREE RENT", TEAL, true),
        WheelSegment::new(7, "FREE RENT", AMBER, true),
        WheelSegment::new(8, "FREE RENT", TEAL, true),
    ]
}

/// Outcome of a spin: the chosen slice and the rotation that shows it.
///
/// `rotation_degrees` is clockwise from rest with the pointer fixed at the top
/// (0°). It always lands the pointer on the centre of `segment_index`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinResolution {
    pub prize: String,
    pub segment_id: u32,
    pub segment_index: usize,
    pub rotation_degrees: f64,
    pub full_rotations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
}

impl SpinResolution {
    /// Absolute rotation for a wheel already turned by `previous_rotation`.
    ///
    /// The result keeps this resolution's landing angle, so the same segment
    /// ends under the pointer, and turns forward by at least
    /// `full_rotations - 1` complete turns.
    pub fn continue_from(&self, previous_rotation: f64) -> f64 {
        previous_rotation - previous_rotation.rem_euclid(DEGREES_PER_TURN) + self.rotation_degrees
    }
}

/// Promo code for a prize label, if the prize has one.
///
/// "FREE RENT" prizes map to `FREERENT{months}`: 12 for one-year prizes,
/// otherwise the first number in the label, otherwise 1.
pub fn promo_code_for(prize: &str) -> Option<String> {
    let upper = prize.to_uppercase();
    if !upper.contains("FREE RENT") {
        return None;
    }

    let months = if upper.contains("1 YEAR") {
        "12".to_string()
    } else {
        let digits: String = upper
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            "1".to_string()
        } else {
            digits
        }
    };

    Some(format!("FREERENT{}", months))
}
