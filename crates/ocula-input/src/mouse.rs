//! Raw mouse packets and the monitor that feeds the accumulator

use std::sync::Arc;

use ocula_core::{BehaviorFlag, BehaviorFlags};

use crate::{MotionDelta, RawInputAccumulator};

/// Raw mouse packet flags (mirrors the OS `usFlags` field)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawMouseFlags(pub u16);

impl RawMouseFlags {
    /// Relative motion is the absence of the absolute bit
    pub const MOVE_RELATIVE: RawMouseFlags = RawMouseFlags(0);

    // Flag bits
    pub const MOVE_ABSOLUTE: u16 = 0x0001;
    pub const VIRTUAL_DESKTOP: u16 = 0x0002;
    pub const ATTRIBUTES_CHANGED: u16 = 0x0004;

    #[inline]
    pub fn new(bits: u16) -> Self {
        RawMouseFlags(bits)
    }

    #[inline]
    pub fn is_relative(self) -> bool {
        self.0 & Self::MOVE_ABSOLUTE == 0
    }

    #[inline]
    pub fn attributes_changed(self) -> bool {
        self.0 & Self::ATTRIBUTES_CHANGED != 0
    }
}

/// One raw mouse packet as delivered by the OS callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawMouseEvent {
    pub flags: RawMouseFlags,
    pub last_x: i32,
    pub last_y: i32,
}

impl RawMouseEvent {
    pub fn relative(dx: i32, dy: i32) -> Self {
        RawMouseEvent {
            flags: RawMouseFlags::MOVE_RELATIVE,
            last_x: dx,
            last_y: dy,
        }
    }

    pub fn absolute(x: i32, y: i32) -> Self {
        RawMouseEvent {
            flags: RawMouseFlags::new(RawMouseFlags::MOVE_ABSOLUTE),
            last_x: x,
            last_y: y,
        }
    }
}

/// Entry point for the OS input thread, and drain point for the frame loop.
///
/// Cloning shares the same accumulator, so one clone can live in the OS
/// callback while another sits in the frame loop.
#[derive(Clone, Debug)]
pub struct RawMouseMonitor {
    accumulator: Arc<RawInputAccumulator>,
    flags: Arc<BehaviorFlags>,
}

impl RawMouseMonitor {
    pub fn new(accumulator: Arc<RawInputAccumulator>, flags: Arc<BehaviorFlags>) -> Self {
        RawMouseMonitor { accumulator, flags }
    }

    /// Feed one raw packet. Only relative motion is accumulated.
    /// Returns whether the packet contributed.
    pub fn on_raw_input(&self, event: RawMouseEvent) -> bool {
        if !event.flags.is_relative() {
            return false;
        }
        if event.flags.attributes_changed() {
            tracing::trace!("mouse attributes changed");
        }
        self.accumulator.append(event.last_x, event.last_y);
        true
    }

    /// Motion summed since the previous call
    pub fn get_and_reset(&self) -> MotionDelta {
        self.accumulator.drain_and_reset()
    }

    /// Mode flag, settable only through the command surface
    pub fn fps_assumed_right_hand(&self) -> bool {
        self.flags.get(BehaviorFlag::FpsAssumedRightHand)
    }

    pub fn accumulator(&self) -> &Arc<RawInputAccumulator> {
        &self.accumulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> RawMouseMonitor {
        RawMouseMonitor::new(
            Arc::new(RawInputAccumulator::new()),
            Arc::new(BehaviorFlags::new()),
        )
    }

    #[test]
    fn test_relative_events_accumulate() {
        let m = monitor();
        assert!(m.on_raw_input(RawMouseEvent::relative(4, -2)));
        assert!(m.on_raw_input(RawMouseEvent::relative(1, 1)));
        assert_eq!(m.get_and_reset(), MotionDelta::new(5, -1));
        assert!(m.get_and_reset().is_zero());
    }

    #[test]
    fn test_absolute_events_ignored() {
        let m = monitor();
        assert!(!m.on_raw_input(RawMouseEvent::absolute(30_000, 12_000)));
        m.on_raw_input(RawMouseEvent::relative(2, 2));
        assert_eq!(m.get_and_reset(), MotionDelta::new(2, 2));
    }

    #[test]
    fn test_attribute_change_still_counts_motion() {
        let m = monitor();
        let event = RawMouseEvent {
            flags: RawMouseFlags::new(RawMouseFlags::ATTRIBUTES_CHANGED),
            last_x: 1,
            last_y: 0,
        };
        assert!(m.on_raw_input(event));
        assert_eq!(m.get_and_reset(), MotionDelta::new(1, 0));
    }

    #[test]
    fn test_clones_share_accumulator() {
        let m = monitor();
        let os_side = m.clone();
        os_side.on_raw_input(RawMouseEvent::relative(7, 0));
        assert_eq!(m.get_and_reset(), MotionDelta::new(7, 0));
    }

    #[test]
    fn test_fps_flag_follows_shared_flags() {
        let flags = Arc::new(BehaviorFlags::new());
        let m = RawMouseMonitor::new(Arc::new(RawInputAccumulator::new()), Arc::clone(&flags));
        assert!(!m.fps_assumed_right_hand());
        flags.set(BehaviorFlag::FpsAssumedRightHand, true);
        assert!(m.fps_assumed_right_hand());
    }
}
