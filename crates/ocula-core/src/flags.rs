//! Behavior flags - live toggles written by the command thread, read by the frame loop
//!
//! Each flag is independently meaningful, so every flag is its own atomic.
//! Stores use `Release` and loads use `Acquire`: a toggle stored before a tick
//! begins is visible to that tick's snapshot.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

/// Live behavior toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorFlag {
    /// Interpret raw pointer motion as a right-hand FPS-style mouse
    FpsAssumedRightHand,
    /// Apply eye micro-motion to the model
    EyeJitter,
    /// Drive blinks from the external tracker
    ExternalTracker,
}

impl BehaviorFlag {
    pub const COUNT: usize = 3;

    pub fn all() -> &'static [BehaviorFlag] {
        &[
            BehaviorFlag::FpsAssumedRightHand,
            BehaviorFlag::EyeJitter,
            BehaviorFlag::ExternalTracker,
        ]
    }

    fn index(self) -> usize {
        match self {
            BehaviorFlag::FpsAssumedRightHand => 0,
            BehaviorFlag::EyeJitter => 1,
            BehaviorFlag::ExternalTracker => 2,
        }
    }

    /// Value at startup
    pub fn default_value(self) -> bool {
        match self {
            BehaviorFlag::FpsAssumedRightHand => false,
            BehaviorFlag::EyeJitter => true,
            BehaviorFlag::ExternalTracker => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorFlag::FpsAssumedRightHand => "fps_assumed_right_hand",
            BehaviorFlag::EyeJitter => "eye_jitter",
            BehaviorFlag::ExternalTracker => "external_tracker",
        }
    }
}

/// Shared flag set. Hand out as `Arc<BehaviorFlags>`.
#[derive(Debug)]
pub struct BehaviorFlags {
    values: [AtomicBool; BehaviorFlag::COUNT],
}

impl BehaviorFlags {
    pub fn new() -> Self {
        BehaviorFlags {
            values: [
                AtomicBool::new(BehaviorFlag::FpsAssumedRightHand.default_value()),
                AtomicBool::new(BehaviorFlag::EyeJitter.default_value()),
                AtomicBool::new(BehaviorFlag::ExternalTracker.default_value()),
            ],
        }
    }

    pub fn get(&self, flag: BehaviorFlag) -> bool {
        self.values[flag.index()].load(Ordering::Acquire)
    }

    /// Store a flag value, returning the previous one
    pub fn set(&self, flag: BehaviorFlag, value: bool) -> bool {
        let previous = self.values[flag.index()].swap(value, Ordering::AcqRel);
        if previous != value {
            debug!(flag = flag.as_str(), value, "behavior flag changed");
        }
        previous
    }

    /// Read every flag once, for use over a whole frame tick
    pub fn snapshot(&self) -> FlagSnapshot {
        FlagSnapshot {
            fps_assumed_right_hand: self.get(BehaviorFlag::FpsAssumedRightHand),
            eye_jitter: self.get(BehaviorFlag::EyeJitter),
            external_tracker: self.get(BehaviorFlag::ExternalTracker),
        }
    }
}

impl Default for BehaviorFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Flag values observed at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSnapshot {
    pub fps_assumed_right_hand: bool,
    pub eye_jitter: bool,
    pub external_tracker: bool,
}

impl FlagSnapshot {
    pub fn get(&self, flag: BehaviorFlag) -> bool {
        match flag {
            BehaviorFlag::FpsAssumedRightHand => self.fps_assumed_right_hand,
            BehaviorFlag::EyeJitter => self.eye_jitter,
            BehaviorFlag::ExternalTracker => self.external_tracker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_defaults() {
        let flags = BehaviorFlags::new();
        for flag in BehaviorFlag::all() {
            assert_eq!(flags.get(*flag), flag.default_value());
        }
    }

    #[test]
    fn test_set_returns_previous() {
        let flags = BehaviorFlags::new();
        assert!(!flags.set(BehaviorFlag::FpsAssumedRightHand, true));
        assert!(flags.set(BehaviorFlag::FpsAssumedRightHand, false));
        assert!(!flags.get(BehaviorFlag::FpsAssumedRightHand));
    }

    #[test]
    fn test_flags_are_independent() {
        let flags = BehaviorFlags::new();
        flags.set(BehaviorFlag::ExternalTracker, true);
        let snapshot = flags.snapshot();
        assert!(snapshot.external_tracker);
        assert!(!snapshot.fps_assumed_right_hand);
        assert!(snapshot.eye_jitter);
    }

    #[test]
    fn test_visible_across_threads() {
        let flags = Arc::new(BehaviorFlags::new());
        let writer = Arc::clone(&flags);
        thread::spawn(move || {
            writer.set(BehaviorFlag::EyeJitter, false);
        })
        .join()
        .unwrap();
        assert!(!flags.snapshot().get(BehaviorFlag::EyeJitter));
    }
}
