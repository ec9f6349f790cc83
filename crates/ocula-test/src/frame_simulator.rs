//! Frame simulator - a full session driven at ~60 Hz
//!
//! A raw input thread pushes mouse packets concurrently with the frame
//! loop. Tracker samples, frame times, command toggles and model
//! attach/detach are drawn from a seeded RNG. Every frame is checked against
//! the blink rate limit, jitter continuity and the jitter gating rules.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use ocula_command::{ENABLE_EYE_JITTER, EX_TRACKER_ENABLE};
use ocula_core::{Bone, ModelLifecycle, OculaResult, Rotation3D};
use ocula_face::TrackerSample;
use ocula_input::RawMouseEvent;
use ocula_runtime::{AvatarSession, FrameInput, RuntimeConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::RecordingModel;

const EPS: f32 = 1e-4;

/// Simulation parameters
#[derive(Clone, Debug)]
pub struct FrameSimConfig {
    pub frames: usize,
    /// Nominal frame time (seconds)
    pub dt: f32,
    /// Uniform frame time variation (seconds, either direction)
    pub dt_jitter: f32,
    /// Chance per frame of a long stall (window drag, sleep)
    pub stall_prob: f64,
    /// Chance per frame of a command toggle arriving
    pub command_prob: f64,
    /// Chance per frame of the model being swapped
    pub reload_prob: f64,
    /// Chance per frame the tracker sample is missing
    pub dropout_prob: f64,
    pub seed: u64,
    pub runtime: RuntimeConfig,
}

impl Default for FrameSimConfig {
    fn default() -> Self {
        let mut runtime = RuntimeConfig::default();
        runtime.jitter.seed = Some(99);
        // Larger than production so continuity is measurable
        runtime.jitter.range_x_deg = 2.0;
        runtime.jitter.range_y_deg = 4.0;
        FrameSimConfig {
            frames: 3_600,
            dt: 1.0 / 60.0,
            dt_jitter: 0.004,
            stall_prob: 0.002,
            command_prob: 0.01,
            reload_prob: 0.002,
            dropout_prob: 0.05,
            seed: 2024,
            runtime,
        }
    }
}

/// Simulation outcome
#[derive(Clone, Debug, Default)]
pub struct FrameSimReport {
    pub frames: u64,
    pub open_violations: u64,
    pub jitter_violations: u64,
    /// Jitter reached the model while disabled or detached
    pub gating_violations: u64,
    pub jitter_frames: u64,
    pub reloads: u64,
    pub max_open_step: f32,
    pub mouse_appended: (i64, i64),
    pub mouse_drained: (i64, i64),
}

impl FrameSimReport {
    pub fn is_clean(&self) -> bool {
        self.open_violations == 0
            && self.jitter_violations == 0
            && self.gating_violations == 0
            && self.mouse_appended == self.mouse_drained
    }
}

/// Run a simulation
pub fn run_frame_simulation(config: &FrameSimConfig) -> OculaResult<FrameSimReport> {
    let (mut session, handles) = AvatarSession::assemble(config.runtime.clone())?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut report = FrameSimReport::default();

    handles.registry.dispatch_parts(EX_TRACKER_ENABLE, true);

    let stop = Arc::new(AtomicBool::new(false));
    let input_thread = {
        let mouse = handles.mouse.clone();
        let stop = Arc::clone(&stop);
        let seed = config.seed ^ 0x5eed;
        thread::spawn(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut sum = (0i64, 0i64);
            while !stop.load(Ordering::Acquire) {
                let (dx, dy) = (rng.gen_range(-20..=20), rng.gen_range(-20..=20));
                mouse.on_raw_input(RawMouseEvent::relative(dx, dy));
                sum.0 += dx as i64;
                sum.1 += dy as i64;
                thread::yield_now();
            }
            sum
        })
    };

    let mut model = RecordingModel::with_eyes();
    session.on_attach(&model);
    let mut jitter_enabled = true;
    let mut blink = (0.0f32, 0.0f32);

    for _ in 0..config.frames {
        if rng.gen_bool(config.command_prob) {
            jitter_enabled = !jitter_enabled;
            handles.registry.dispatch_parts(ENABLE_EYE_JITTER, jitter_enabled);
        }
        if rng.gen_bool(config.reload_prob) {
            session.on_detach();
            model = if rng.gen_bool(0.8) {
                RecordingModel::with_eyes()
            } else {
                RecordingModel::without_eyes()
            };
            session.on_attach(&model);
            blink = (0.0, 0.0);
            report.reloads += 1;
        }

        let dt = if rng.gen_bool(config.stall_prob) {
            rng.gen_range(0.2..2.0)
        } else {
            config.dt + rng.gen_range(-config.dt_jitter..=config.dt_jitter)
        };

        let mut input = FrameInput::new(dt);
        if !rng.gen_bool(config.dropout_prob) {
            input = input.with_tracker(random_sample(&mut rng));
        }

        let before = session.jitter().current_offset();
        let applied_before = model.applied.len();
        let out = session.tick(&input, Some(&mut model));
        report.frames += 1;

        // Blink: opening bounded by the clamped frame time
        let limit = config
            .runtime
            .blink
            .max_open_delta(config.runtime.clamp_frame_delta(dt));
        for (prev, next) in [(blink.0, out.blink.left), (blink.1, out.blink.right)] {
            let step = prev - next;
            report.max_open_step = report.max_open_step.max(step);
            if step > limit + EPS {
                report.open_violations += 1;
            }
        }
        blink = (out.blink.left, out.blink.right);

        // Jitter: one smoothing step at most
        let target = session.jitter().state().target_offset;
        let factor = (config.runtime.jitter.speed_factor * session.stats().last_dt).min(1.0);
        if before.angle_to(&out.jitter_offset) > before.angle_to(&target) * factor + EPS {
            report.jitter_violations += 1;
        }

        // Gating
        let touched = model.applied.len() > applied_before;
        let visible = jitter_enabled && session.jitter().eyes_ready();
        if touched != out.jitter_applied || (touched && !visible) {
            report.gating_violations += 1;
        }
        if touched {
            report.jitter_frames += 1;
        }

        report.mouse_drained.0 += out.mouse_delta.dx as i64;
        report.mouse_drained.1 += out.mouse_delta.dy as i64;
    }

    stop.store(true, Ordering::Release);
    if let Ok(sum) = input_thread.join() {
        report.mouse_appended = sum;
    }
    let rest = handles.mouse.get_and_reset();
    report.mouse_drained.0 += rest.dx as i64;
    report.mouse_drained.1 += rest.dy as i64;

    Ok(report)
}

fn random_sample(rng: &mut StdRng) -> TrackerSample {
    // Mostly open with noise, occasionally a full blink, occasionally garbage
    let blink: f32 = if rng.gen_bool(0.05) {
        1.0
    } else {
        rng.gen_range(0.0..0.4)
    };
    let noise = |rng: &mut StdRng| -> f32 { rng.gen_range(-0.05..0.05) };
    let mut sample = TrackerSample::new(
        blink + noise(rng),
        blink + noise(rng),
        rng.gen_range(0.0..0.6),
        rng.gen_range(0.0..0.6),
    );
    if rng.gen_bool(0.01) {
        sample.left_blink = f32::NAN;
        sample.right_squint = 3.0;
    }
    sample
}

/// Rotations a model received for one eye, in order
pub fn eye_track(model: &RecordingModel, bone: Bone) -> Vec<Rotation3D> {
    model.rotations_for(bone).copied().collect()
}
