//! Blink blending - tracker blink/squint to smoothed eyelid values
//!
//! Per eye, per frame:
//! 1. Dead-zone remap of the raw blink into [0, 1]
//! 2. Blend toward a half-closed value by the squint amount, unless the
//!    eye is already nearly shut
//! 3. Close instantly, open no faster than `open_speed_max` per reference frame
//! 4. Clamp

use ocula_core::{OculaError, OculaResult};
use serde::{Deserialize, Serialize};

use crate::{clamp01, TrackerSample};

/// Blink blending configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Raw blink at or below this maps to fully open
    pub eye_map_min: f32,
    /// Raw blink at or above this maps to fully closed
    pub eye_map_max: f32,
    /// Blink value a full squint pulls the eyelid toward
    pub blink_value_on_squint: f32,
    /// Largest opening step per reference frame
    pub open_speed_max: f32,
    /// Frame rate `open_speed_max` is expressed in
    pub reference_fps: f32,
    /// Mapped values at or above this skip squint blending
    pub squint_blend_threshold: f32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        BlinkConfig {
            eye_map_min: 0.2,
            eye_map_max: 0.8,
            blink_value_on_squint: 0.5,
            open_speed_max: 0.1,
            reference_fps: 60.0,
            squint_blend_threshold: 0.9,
        }
    }
}

impl BlinkConfig {
    pub fn validate(&self) -> OculaResult<()> {
        let unit = |name: &str, v: f32| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(OculaError::InvalidConfig(format!(
                    "blink.{name} must be within [0, 1], got {v}"
                )))
            }
        };
        unit("eye_map_min", self.eye_map_min)?;
        unit("eye_map_max", self.eye_map_max)?;
        unit("blink_value_on_squint", self.blink_value_on_squint)?;
        unit("squint_blend_threshold", self.squint_blend_threshold)?;

        if self.eye_map_min >= self.eye_map_max {
            return Err(OculaError::InvalidConfig(format!(
                "blink.eye_map_min ({}) must be below blink.eye_map_max ({})",
                self.eye_map_min, self.eye_map_max
            )));
        }
        if !(self.open_speed_max.is_finite() && self.open_speed_max >= 0.0) {
            return Err(OculaError::InvalidConfig(format!(
                "blink.open_speed_max must be finite and non-negative, got {}",
                self.open_speed_max
            )));
        }
        if !(self.reference_fps.is_finite() && self.reference_fps > 0.0) {
            return Err(OculaError::InvalidConfig(format!(
                "blink.reference_fps must be positive, got {}",
                self.reference_fps
            )));
        }
        Ok(())
    }

    /// Dead-zone remap of a raw blink value into [0, 1]
    #[inline]
    pub fn map_clamp(&self, raw: f32) -> f32 {
        clamp01((clamp01(raw) - self.eye_map_min) / (self.eye_map_max - self.eye_map_min))
    }

    /// Largest allowed opening step for a frame of `dt` seconds
    #[inline]
    pub fn max_open_delta(&self, dt: f32) -> f32 {
        self.open_speed_max * dt.max(0.0) * self.reference_fps
    }
}

/// Something that supplies eyelid closure for the face rig
pub trait BlinkSource {
    fn left(&self) -> f32;
    fn right(&self) -> f32;
}

/// Eyelid closure, 0 = open, 1 = closed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlinkState {
    pub left: f32,
    pub right: f32,
}

impl BlinkSource for BlinkState {
    fn left(&self) -> f32 {
        self.left
    }

    fn right(&self) -> f32 {
        self.right
    }
}

/// One eye through steps 2-4, given its already-mapped value
#[inline]
pub fn blend_eye(
    config: &BlinkConfig,
    mapped: f32,
    squint: f32,
    previous: f32,
    max_open_delta: f32,
) -> f32 {
    let mut value = mapped;
    if value < config.squint_blend_threshold {
        value = lerp(value, config.blink_value_on_squint, clamp01(squint));
    }
    // Closing is instant; opening is floored at `previous - max_open_delta`
    value = value.max(previous - max_open_delta);
    clamp01(value)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Per-session blink state machine
#[derive(Debug, Clone)]
pub struct BlinkBlendEngine {
    config: BlinkConfig,
    state: BlinkState,
}

impl BlinkBlendEngine {
    pub fn new(config: BlinkConfig) -> Self {
        BlinkBlendEngine {
            config,
            state: BlinkState::default(),
        }
    }

    pub fn config(&self) -> &BlinkConfig {
        &self.config
    }

    /// Latest output
    pub fn state(&self) -> BlinkState {
        self.state
    }

    /// Advance one frame of `dt` seconds
    pub fn update(&mut self, sample: &TrackerSample, dt: f32) -> BlinkState {
        let max_open = self.config.max_open_delta(dt);

        let left = self.config.map_clamp(sample.left_blink);
        let right = self.config.map_clamp(sample.right_blink);

        self.state = BlinkState {
            left: blend_eye(&self.config, left, sample.left_squint, self.state.left, max_open),
            right: blend_eye(&self.config, right, sample.right_squint, self.state.right, max_open),
        };
        self.state
    }

    /// Forget previous frames; eyes open
    pub fn reset(&mut self) {
        self.state = BlinkState::default();
    }
}

impl Default for BlinkBlendEngine {
    fn default() -> Self {
        Self::new(BlinkConfig::default())
    }
}

impl BlinkSource for BlinkBlendEngine {
    fn left(&self) -> f32 {
        self.state.left
    }

    fn right(&self) -> f32 {
        self.state.right
    }
}
