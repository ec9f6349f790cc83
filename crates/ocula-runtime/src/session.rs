//! Avatar session - explicit wiring and the per-frame tick

use std::sync::Arc;

use ocula_command::CommandDispatchRegistry;
use ocula_core::{
    BehaviorFlag, BehaviorFlags, FlagSnapshot, ModelLifecycle, OculaResult, Rotation3D, Skeleton,
};
use ocula_face::{BlinkBlendEngine, BlinkState, JitterGenerator, TrackerSample};
use ocula_input::{MotionDelta, RawInputAccumulator, RawMouseMonitor};
use tracing::{debug, info};

use crate::RuntimeConfig;

/// Handles for the threads that feed a session
#[derive(Clone, Debug)]
pub struct SessionHandles {
    /// Give a clone to the OS raw-input callback
    pub mouse: RawMouseMonitor,
    /// Give to the IPC receiving side
    pub registry: Arc<CommandDispatchRegistry>,
    pub flags: Arc<BehaviorFlags>,
}

/// Per-frame input from the host loop
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Seconds since the previous tick
    pub dt: f32,
    /// Latest tracker sample, if the tracker delivered one
    pub tracker: Option<TrackerSample>,
    /// Gaze rotation the eyes already carry; jitter is composed on top
    pub eye_base_rotation: Rotation3D,
}

impl FrameInput {
    pub fn new(dt: f32) -> Self {
        FrameInput {
            dt,
            tracker: None,
            eye_base_rotation: Rotation3D::identity(),
        }
    }

    pub fn with_tracker(mut self, sample: TrackerSample) -> Self {
        self.tracker = Some(sample);
        self
    }

    pub fn with_eye_base_rotation(mut self, rotation: Rotation3D) -> Self {
        self.eye_base_rotation = rotation;
        self
    }
}

/// What one tick produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    pub blink: BlinkState,
    /// Pointer motion since the previous tick
    pub mouse_delta: MotionDelta,
    pub fps_assumed_right_hand: bool,
    pub jitter_offset: Rotation3D,
    /// Whether the jitter rotation reached the model this tick
    pub jitter_applied: bool,
}

#[derive(Clone, Debug, Default)]
pub struct SessionStats {
    pub ticks: u64,
    pub tracker_frames: u64,
    pub jitter_frames: u64,
    pub attaches: u64,
    pub detaches: u64,
    pub last_dt: f32,
}

/// Frame-loop side of OCULA.
///
/// Owns the per-frame engines; shares only the raw-input accumulator and the
/// behavior flags with other threads.
#[derive(Debug)]
pub struct AvatarSession {
    config: RuntimeConfig,
    flags: Arc<BehaviorFlags>,
    mouse: RawMouseMonitor,
    blink: BlinkBlendEngine,
    jitter: JitterGenerator,
    attached: bool,
    stats: SessionStats,
}

impl AvatarSession {
    /// Build every component and bind the command handlers.
    ///
    /// The registry is complete when this returns; callers get it only
    /// behind an `Arc`, so nothing registers during dispatch.
    pub fn assemble(config: RuntimeConfig) -> OculaResult<(AvatarSession, SessionHandles)> {
        config.validate()?;

        let flags = Arc::new(BehaviorFlags::new());
        if config.tracker_backend.is_enabled() {
            flags.set(BehaviorFlag::ExternalTracker, true);
        }

        let accumulator = Arc::new(RawInputAccumulator::new());
        let mouse = RawMouseMonitor::new(accumulator, Arc::clone(&flags));
        let registry = Arc::new(CommandDispatchRegistry::with_flag_commands(&flags));

        let session = AvatarSession {
            blink: BlinkBlendEngine::new(config.blink.clone()),
            jitter: JitterGenerator::new(config.jitter.clone())?,
            config,
            flags: Arc::clone(&flags),
            mouse: mouse.clone(),
            attached: false,
            stats: SessionStats::default(),
        };

        info!(
            commands = registry.len(),
            tracker = ?session.config.tracker_backend,
            "avatar session assembled"
        );

        Ok((
            session,
            SessionHandles {
                mouse,
                registry,
                flags,
            },
        ))
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn blink(&self) -> &BlinkBlendEngine {
        &self.blink
    }

    pub fn jitter(&self) -> &JitterGenerator {
        &self.jitter
    }

    /// Run one frame.
    ///
    /// Flags are read once up front, raw input is drained once, and the
    /// skeleton (if a model is loaded) receives at most one rotation per eye.
    pub fn tick(&mut self, input: &FrameInput, skeleton: Option<&mut dyn Skeleton>) -> FrameOutput {
        let flags: FlagSnapshot = self.flags.snapshot();
        let dt = self.config.clamp_frame_delta(input.dt);

        let mouse_delta = self.mouse.get_and_reset();

        let blink = match input.tracker {
            Some(sample) if flags.external_tracker => {
                self.stats.tracker_frames += 1;
                self.blink.update(&sample.sanitized(), dt)
            }
            _ => self.blink.state(),
        };

        self.jitter.set_active(flags.eye_jitter);
        let jitter_offset = self.jitter.update(dt);
        let jitter_applied = match skeleton {
            Some(skeleton) if self.attached => self.jitter.apply(skeleton, input.eye_base_rotation),
            _ => false,
        };
        if jitter_applied {
            self.stats.jitter_frames += 1;
        }

        self.stats.ticks += 1;
        self.stats.last_dt = dt;

        FrameOutput {
            blink,
            mouse_delta,
            fps_assumed_right_hand: flags.fps_assumed_right_hand,
            jitter_offset,
            jitter_applied,
        }
    }
}

impl ModelLifecycle for AvatarSession {
    fn on_attach(&mut self, skeleton: &dyn Skeleton) {
        self.jitter.on_attach(skeleton);
        self.blink.reset();
        self.attached = true;
        self.stats.attaches += 1;
        debug!(eyes_ready = self.jitter.eyes_ready(), "model attached");
    }

    fn on_detach(&mut self) {
        self.jitter.on_detach();
        self.blink.reset();
        self.attached = false;
        self.stats.detaches += 1;
        debug!("model detached");
    }
}
