//! Tracker sample - the external tracker's eye output for one frame

use serde::{Deserialize, Serialize};

/// Clamp to [0, 1], mapping NaN to 0
#[inline]
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Eye blend values reported by the tracker, all nominally in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerSample {
    pub left_blink: f32,
    pub right_blink: f32,
    pub left_squint: f32,
    pub right_squint: f32,
}

impl TrackerSample {
    pub fn new(left_blink: f32, right_blink: f32, left_squint: f32, right_squint: f32) -> Self {
        TrackerSample {
            left_blink,
            right_blink,
            left_squint,
            right_squint,
        }
    }

    /// Both eyes with the same blink and no squint
    pub fn symmetric(blink: f32) -> Self {
        Self::new(blink, blink, 0.0, 0.0)
    }

    /// Copy with every field clamped into [0, 1]
    pub fn sanitized(&self) -> Self {
        TrackerSample {
            left_blink: clamp01(self.left_blink),
            right_blink: clamp01(self.right_blink),
            left_squint: clamp01(self.left_squint),
            right_squint: clamp01(self.right_squint),
        }
    }
}
