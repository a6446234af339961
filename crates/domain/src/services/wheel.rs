//! Wheel outcome resolution.
//!
//! The pointer sits at the top of the wheel (0°). At rest, segment `i`
//! spans `[i * arc, (i + 1) * arc)` clockwise from the pointer. A spin
//! rotates the wheel clockwise by `rotation_degrees`.

use std::collections::HashSet;

use rand::Rng;
use thiserror::Error;

use crate::models::{default_segments, promo_code_for, SpinResolution, WheelSegment};

/// Whole turns added to every spin, inclusive.
pub const MIN_FULL_ROTATIONS: u32 = 5;
pub const MAX_FULL_ROTATIONS: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WheelError {
    #[error("Wheel has no segments")]
    Empty,

    #[error("Wheel has no winnable segment")]
    NoWinnableSegment,

    #[error("Duplicate segment id: {0}")]
    DuplicateSegment(u32),
}

/// A validated wheel.
#[derive(Debug, Clone)]
pub struct Wheel {
    segments: Vec<WheelSegment>,
    winnable: Vec<usize>,
}

impl Default for Wheel {
    fn default() -> Self {
        let segments = default_segments();
        let winnable = winnable_indices(&segments);
        Self { segments, winnable }
    }
}

fn winnable_indices(segments: &[WheelSegment]) -> Vec<usize> {
    segments
        .iter()
        .enumerate()
        .filter(|(_, s)| s.can_win)
        .map(|(i, _)| i)
        .collect()
}

impl Wheel {
    pub fn new(segments: Vec<WheelSegment>) -> Result<Self, WheelError> {
        if segments.is_empty() {
            return Err(WheelError::Empty);
        }

        let mut seen = HashSet::new();
        for segment in &segments {
            if !seen.insert(segment.id) {
                return Err(WheelError::DuplicateSegment(segment.id));
            }
        }

        let winnable = winnable_indices(&segments);
        if winnable.is_empty() {
            return Err(WheelError::NoWinnableSegment);
        }

        Ok(Self { segments, winnable })
    }

    pub fn segments(&self) -> &[WheelSegment] {
        &self.segments
    }

    /// Arc covered by each segment, in degrees.
    pub fn segment_angle(&self) -> f64 {
        360.0 / self.segments.len() as f64
    }

    /// Picks a winnable segment uniformly and computes the landing rotation.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> SpinResolution {
        let index = self.winnable[rng.gen_range(0..self.winnable.len())];
        let full_rotations = rng.gen_range(MIN_FULL_ROTATIONS..=MAX_FULL_ROTATIONS);

        let arc = self.segment_angle();
        let target_angle = index as f64 * arc + arc / 2.0;
        let rotation_degrees = f64::from(full_rotations) * 360.0 + (360.0 - target_angle);

        let segment = &self.segments[index];
        SpinResolution {
            prize: segment.label.clone(),
            segment_id: segment.id,
            segment_index: index,
            rotation_degrees,
            full_rotations,
            promo_code: promo_code_for(&segment.label),
        }
    }

    /// Resolves a spin with the thread-local RNG.
    pub fn resolve_spin(&self) -> SpinResolution {
        self.resolve(&mut rand::thread_rng())
    }

    /// Index of the segment under the pointer after rotating by `rotation`.
    pub fn segment_under_pointer(&self, rotation: f64) -> usize {
        let at_pointer = (-rotation).rem_euclid(360.0);
        let index = (at_pointer / self.segment_angle()).floor() as usize;
        index.min(self.segments.len() - 1)
    }
}
