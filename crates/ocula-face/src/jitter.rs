//! Eye jitter - small involuntary-looking eye rotations
//!
//! A countdown picks a new random target offset every `min_interval` to
//! `max_interval` seconds. The current offset chases the target with
//! exponential smoothing every frame, so a retarget never causes a jump.

use ocula_core::{
    has_all_bones, Bone, ModelLifecycle, OculaError, OculaResult, Rotation3D, Skeleton,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

/// Largest accepted `range_x_deg` / `range_y_deg`
pub const MAX_JITTER_RANGE_DEG: f32 = 180.0;

/// Jitter configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterConfig {
    /// Shortest time between retargets (seconds)
    pub min_interval: f32,
    /// Longest time between retargets (seconds)
    pub max_interval: f32,
    /// Largest rotation about X (degrees, either direction)
    pub range_x_deg: f32,
    /// Largest rotation about Y (degrees, either direction)
    pub range_y_deg: f32,
    /// Smoothing speed; the offset covers `speed_factor * dt` of the remaining gap per frame
    pub speed_factor: f32,
    /// Fixed RNG seed, for reproducible runs
    pub seed: Option<u64>,
}

impl Default for JitterConfig {
    fn default() -> Self {
        JitterConfig {
            min_interval: 0.4,
            max_interval: 2.0,
            range_x_deg: 0.001,
            range_y_deg: 0.03,
            speed_factor: 11.0,
            seed: None,
        }
    }
}

impl JitterConfig {
    pub fn validate(&self) -> OculaResult<()> {
        let non_negative = |name: &str, v: f32| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(OculaError::InvalidConfig(format!(
                    "jitter.{name} must be finite and non-negative, got {v}"
                )))
            }
        };
        non_negative("min_interval", self.min_interval)?;
        non_negative("max_interval", self.max_interval)?;
        non_negative("range_x_deg", self.range_x_deg)?;
        non_negative("range_y_deg", self.range_y_deg)?;
        non_negative("speed_factor", self.speed_factor)?;

        let ranges = [("range_x_deg", self.range_x_deg), ("range_y_deg", self.range_y_deg)];
        for (name, range) in ranges {
            if range > MAX_JITTER_RANGE_DEG {
                return Err(OculaError::InvalidConfig(format!(
                    "jitter.{name} must be at most {MAX_JITTER_RANGE_DEG}, got {range}"
                )));
            }
        }

        if self.min_interval > self.max_interval {
            return Err(OculaError::InvalidConfig(format!(
                "jitter.min_interval ({}) exceeds jitter.max_interval ({})",
                self.min_interval, self.max_interval
            )));
        }
        Ok(())
    }
}

/// Jitter process state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterState {
    /// Seconds until the next retarget
    pub remaining_time: f32,
    pub target_offset: Rotation3D,
    pub current_offset: Rotation3D,
    /// Whether the offset should reach the model
    pub active: bool,
}

impl Default for JitterState {
    fn default() -> Self {
        JitterState {
            remaining_time: 0.0,
            target_offset: Rotation3D::identity(),
            current_offset: Rotation3D::identity(),
            active: false,
        }
    }
}

/// Stochastic eye micro-motion generator
#[derive(Debug)]
pub struct JitterGenerator {
    config: JitterConfig,
    state: JitterState,
    rng: StdRng,
    /// Both eye bones exist on the attached model
    eyes_ready: bool,
    retargets: u64,
}

impl JitterGenerator {
    /// Build a generator; rejects any config that `validate` rejects.
    pub fn new(config: JitterConfig) -> OculaResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(JitterGenerator {
            config,
            state: JitterState::default(),
            rng,
            eyes_ready: false,
            retargets: 0,
        })
    }

    pub fn config(&self) -> &JitterConfig {
        &self.config
    }

    pub fn state(&self) -> &JitterState {
        &self.state
    }

    pub fn current_offset(&self) -> Rotation3D {
        self.state.current_offset
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.state.active = active;
    }

    pub fn eyes_ready(&self) -> bool {
        self.eyes_ready
    }

    /// Whether [`JitterGenerator::apply`] would touch the model
    pub fn is_visible(&self) -> bool {
        self.state.active && self.eyes_ready
    }

    pub fn retarget_count(&self) -> u64 {
        self.retargets
    }

    /// Advance by `dt` seconds. Runs whether or not the offset is visible.
    pub fn update(&mut self, dt: f32) -> Rotation3D {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.state.remaining_time -= dt;
        if self.state.remaining_time < 0.0 {
            self.retarget();
        }

        self.state.current_offset = self
            .state
            .current_offset
            .slerp(&self.state.target_offset, self.config.speed_factor * dt);
        self.state.current_offset
    }

    fn retarget(&mut self) {
        let c = &self.config;
        self.state.remaining_time = self.rng.gen_range(c.min_interval..=c.max_interval);

        let x = self.rng.gen_range(-c.range_x_deg..=c.range_x_deg);
        let y = self.rng.gen_range(-c.range_y_deg..=c.range_y_deg);
        self.state.target_offset = Rotation3D::from_euler_degrees(x, y, 0.0);
        self.retargets += 1;

        trace!(x, y, next_in = self.state.remaining_time, "jitter retarget");
    }

    /// Multiply `base * current_offset` onto both eye bones.
    /// Returns false, touching nothing, unless active with both eyes present.
    pub fn apply(&self, skeleton: &mut dyn Skeleton, base: Rotation3D) -> bool {
        if !self.is_visible() {
            return false;
        }
        let rotation = base * self.state.current_offset;
        for bone in Bone::eyes() {
            skeleton.apply_rotation(*bone, rotation);
        }
        true
    }
}

impl ModelLifecycle for JitterGenerator {
    fn on_attach(&mut self, skeleton: &dyn Skeleton) {
        self.eyes_ready = has_all_bones(skeleton, Bone::eyes());
        info!(eyes_ready = self.eyes_ready, "jitter attached to model");
    }

    fn on_detach(&mut self) {
        self.eyes_ready = false;
        self.state.active = false;
        info!("jitter detached from model");
    }
}
