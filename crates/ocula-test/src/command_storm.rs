//! Command storm - a seeded command sequence dispatched from an IPC thread
//! while a frame thread keeps snapshotting the flags

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use ocula_command::{flag_commands, Command, CommandDispatchRegistry, DispatchStats, Payload};
use ocula_core::{BehaviorFlag, BehaviorFlags, FlagSnapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Storm parameters
#[derive(Clone, Debug)]
pub struct CommandStormConfig {
    pub commands: usize,
    /// Probability a command uses an unregistered id
    pub unknown_prob: f64,
    /// Probability a known command carries an uncoercible payload
    pub malformed_prob: f64,
    pub seed: u64,
}

impl Default for CommandStormConfig {
    fn default() -> Self {
        CommandStormConfig {
            commands: 5_000,
            unknown_prob: 0.1,
            malformed_prob: 0.1,
            seed: 7,
        }
    }
}

/// Result of a storm
#[derive(Clone, Debug)]
pub struct CommandStormReport {
    pub expected: DispatchStats,
    pub observed: DispatchStats,
    /// Flag values implied by the last valid command for each flag
    pub expected_flags: FlagSnapshot,
    pub final_flags: FlagSnapshot,
    pub snapshots_taken: u64,
    /// Snapshots holding a flag value no command in the sequence could produce
    pub impossible_snapshots: u64,
}

impl CommandStormReport {
    pub fn is_consistent(&self) -> bool {
        self.expected == self.observed
            && self.expected_flags == self.final_flags
            && self.impossible_snapshots == 0
    }
}

/// Build the command sequence and the state it should leave behind
pub fn generate_commands(
    config: &CommandStormConfig,
) -> (Vec<Command>, DispatchStats, FlagSnapshot) {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let defaults = BehaviorFlags::new();
    let mut expected_flags = defaults.snapshot();
    let mut expected = DispatchStats::default();
    let known = flag_commands();

    let commands: Vec<Command> = (0..config.commands)
        .map(|i| {
            if rng.gen_bool(config.unknown_prob) {
                expected.unknown += 1;
                return Command::new(format!("Unregistered{i}"), rng.gen::<bool>());
            }
            let (id, flag) = known[rng.gen_range(0..known.len())];
            if rng.gen_bool(config.malformed_prob) {
                expected.malformed += 1;
                let payload = if rng.gen() {
                    Payload::Number(rng.gen_range(-1.0..1.0))
                } else {
                    Payload::Text("maybe".to_string())
                };
                return Command::new(id, payload);
            }
            expected.handled += 1;
            let value: bool = rng.gen();
            set_expected(&mut expected_flags, flag, value);
            if rng.gen() {
                Command::new(id, value)
            } else {
                Command::new(id, if value { "True" } else { "false" })
            }
        })
        .collect();

    (commands, expected, expected_flags)
}

fn set_expected(snapshot: &mut FlagSnapshot, flag: BehaviorFlag, value: bool) {
    match flag {
        BehaviorFlag::FpsAssumedRightHand => snapshot.fps_assumed_right_hand = value,
        BehaviorFlag::EyeJitter => snapshot.eye_jitter = value,
        BehaviorFlag::ExternalTracker => snapshot.external_tracker = value,
    }
}

/// Every (flag, value) pair a frame may observe: the defaults plus each
/// value a well-formed command in `commands` sets.
fn reachable_values(commands: &[Command]) -> Vec<(BehaviorFlag, bool)> {
    let mut reachable: Vec<_> = BehaviorFlag::all()
        .iter()
        .map(|flag| (*flag, flag.default_value()))
        .collect();
    for command in commands {
        let flag = flag_commands()
            .iter()
            .find(|(id, _)| *id == command.id)
            .map(|(_, flag)| *flag);
        if let (Some(flag), Some(value)) = (flag, command.payload.as_bool()) {
            if !reachable.contains(&(flag, value)) {
                reachable.push((flag, value));
            }
        }
    }
    reachable
}

/// Dispatch the sequence from one thread while another snapshots flags
pub fn run_command_storm(config: &CommandStormConfig) -> CommandStormReport {
    let flags = Arc::new(BehaviorFlags::new());
    let registry = Arc::new(CommandDispatchRegistry::with_flag_commands(&flags));
    let (commands, expected, expected_flags) = generate_commands(config);
    let reachable = reachable_values(&commands);

    let done = Arc::new(AtomicBool::new(false));
    let ipc = {
        let registry = Arc::clone(&registry);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for command in &commands {
                registry.dispatch(command);
            }
            done.store(true, Ordering::Release);
        })
    };

    let mut snapshots_taken = 0;
    let mut impossible_snapshots = 0;
    while !done.load(Ordering::Acquire) {
        let snapshot = flags.snapshot();
        let possible = BehaviorFlag::all()
            .iter()
            .all(|flag| reachable.contains(&(*flag, snapshot.get(*flag))));
        if !possible {
            impossible_snapshots += 1;
        }
        snapshots_taken += 1;
        thread::yield_now();
    }
    if ipc.join().is_err() {
        tracing::error!("ipc thread panicked");
    }

    CommandStormReport {
        expected,
        observed: registry.stats(),
        expected_flags,
        final_flags: flags.snapshot(),
        snapshots_taken,
        impossible_snapshots,
    }
}
