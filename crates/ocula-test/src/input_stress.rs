//! Raw input stress - many producer threads against one draining consumer
//!
//! Every producer keeps its own exact sum. The consumer drains at its own
//! pace while producers run, then once more after they finish. The drained
//! sum must equal the appended sum exactly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use ocula_core::BehaviorFlags;
use ocula_input::{RawInputAccumulator, RawMouseEvent, RawMouseMonitor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Stress run parameters
#[derive(Clone, Debug)]
pub struct InputStressConfig {
    pub producers: usize,
    pub events_per_producer: usize,
    /// Largest |dx| or |dy| per event
    pub max_delta: i32,
    /// Fraction of events sent as absolute packets (ignored by the monitor)
    pub absolute_ratio: f64,
    pub seed: u64,
}

impl Default for InputStressConfig {
    fn default() -> Self {
        InputStressConfig {
            producers: 2,
            events_per_producer: 10_000,
            max_delta: 50,
            absolute_ratio: 0.0,
            seed: 0x0c01a,
        }
    }
}

impl InputStressConfig {
    /// A single gaming mouse at high polling rate
    pub fn light() -> Self {
        InputStressConfig {
            producers: 1,
            events_per_producer: 20_000,
            ..Default::default()
        }
    }

    /// Several devices with mixed packet kinds
    pub fn heavy() -> Self {
        InputStressConfig {
            producers: 8,
            events_per_producer: 25_000,
            max_delta: 120,
            absolute_ratio: 0.1,
            seed: 0xbeef,
        }
    }
}

/// Result of a stress run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputStressReport {
    pub appended: (i64, i64),
    pub drained: (i64, i64),
    pub drains: u64,
    pub non_empty_drains: u64,
    pub ignored_events: u64,
    /// A drain with nothing appended afterwards returned zero
    pub final_drain_empty: bool,
}

impl InputStressReport {
    pub fn is_consistent(&self) -> bool {
        self.appended == self.drained && self.final_drain_empty
    }
}

struct ProducerTotals {
    dx: i64,
    dy: i64,
    ignored: u64,
}

/// Run producers against a fresh monitor and report the totals
pub fn run_input_stress(config: &InputStressConfig) -> InputStressReport {
    let monitor = RawMouseMonitor::new(
        Arc::new(RawInputAccumulator::new()),
        Arc::new(BehaviorFlags::new()),
    );
    let running = Arc::new(AtomicUsize::new(config.producers));

    let producers: Vec<_> = (0..config.producers)
        .map(|i| {
            let monitor = monitor.clone();
            let running = Arc::clone(&running);
            let config = config.clone();
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(i as u64));
                let mut totals = ProducerTotals { dx: 0, dy: 0, ignored: 0 };
                for _ in 0..config.events_per_producer {
                    let dx = rng.gen_range(-config.max_delta..=config.max_delta);
                    let dy = rng.gen_range(-config.max_delta..=config.max_delta);
                    if rng.gen_bool(config.absolute_ratio) {
                        monitor.on_raw_input(RawMouseEvent::absolute(dx, dy));
                        totals.ignored += 1;
                    } else {
                        monitor.on_raw_input(RawMouseEvent::relative(dx, dy));
                        totals.dx += dx as i64;
                        totals.dy += dy as i64;
                    }
                }
                running.fetch_sub(1, Ordering::Release);
                totals
            })
        })
        .collect();

    let mut report = InputStressReport::default();
    let drain = |report: &mut InputStressReport| {
        let delta = monitor.get_and_reset();
        report.drains += 1;
        if !delta.is_zero() {
            report.non_empty_drains += 1;
        }
        report.drained.0 += delta.dx as i64;
        report.drained.1 += delta.dy as i64;
    };

    while running.load(Ordering::Acquire) > 0 {
        drain(&mut report);
        thread::yield_now();
    }

    for producer in producers {
        match producer.join() {
            Ok(totals) => {
                report.appended.0 += totals.dx;
                report.appended.1 += totals.dy;
                report.ignored_events += totals.ignored;
            }
            Err(_) => tracing::error!("input producer panicked"),
        }
    }

    drain(&mut report);
    report.final_drain_empty = monitor.get_and_reset().is_zero();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_light_stress_consistent() {
        let report = run_input_stress(&InputStressConfig::light());
        assert!(report.is_consistent(), "{report:?}");
        assert_eq!(report.ignored_events, 0);
    }

    #[test]
    fn test_heavy_stress_consistent() {
        let report = run_input_stress(&InputStressConfig::heavy());
        assert!(report.is_consistent(), "{report:?}");
        assert!(report.ignored_events > 0);
        assert!(report.drains >= 1);
    }

    #[test]
    fn test_zero_producers() {
        let config = InputStressConfig {
            producers: 0,
            ..Default::default()
        };
        let report = run_input_stress(&config);
        assert!(report.is_consistent());
        assert_eq!(report.appended, (0, 0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_stress_consistent_for_any_seed(
            seed in any::<u64>(),
            producers in 0usize..4,
            max_delta in 1i32..1_000,
            absolute_ratio in 0.0f64..=1.0,
        ) {
            let config = InputStressConfig {
                producers,
                events_per_producer: 500,
                max_delta,
                absolute_ratio,
                seed,
            };
            let report = run_input_stress(&config);
            prop_assert!(report.is_consistent(), "{:?}", report);
        }
    }
}
