//! Recognized command identifiers

use ocula_core::BehaviorFlag;

/// Treat raw pointer motion as a right-hand FPS-style mouse (bool)
pub const ENABLE_FPS_ASSUMED_RIGHT_HAND: &str = "EnableFpsAssumedRightHand";

/// Toggle eye micro-motion (bool)
pub const ENABLE_EYE_JITTER: &str = "EnableEyeJitter";

/// Toggle tracker-driven blinks (bool)
pub const EX_TRACKER_ENABLE: &str = "ExTrackerEnable";

/// Boolean commands and the flag each one drives
pub fn flag_commands() -> &'static [(&'static str, BehaviorFlag)] {
    &[
        (ENABLE_FPS_ASSUMED_RIGHT_HAND, BehaviorFlag::FpsAssumedRightHand),
        (ENABLE_EYE_JITTER, BehaviorFlag::EyeJitter),
        (EX_TRACKER_ENABLE, BehaviorFlag::ExternalTracker),
    ]
}
