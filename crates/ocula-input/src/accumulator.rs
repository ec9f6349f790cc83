//! Raw motion accumulator with atomic drain

use parking_lot::Mutex;

/// Summed pointer motion since the last drain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionDelta {
    pub dx: i32,
    pub dy: i32,
}

impl MotionDelta {
    pub const ZERO: MotionDelta = MotionDelta { dx: 0, dy: 0 };

    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    fn saturating_add(self, dx: i32, dy: i32) -> Self {
        MotionDelta {
            dx: self.dx.saturating_add(dx),
            dy: self.dy.saturating_add(dy),
        }
    }
}

impl From<MotionDelta> for (i32, i32) {
    fn from(delta: MotionDelta) -> Self {
        (delta.dx, delta.dy)
    }
}

/// Thread-safe motion sink.
///
/// `append` and `drain_and_reset` serialize on one short critical section, so
/// every append lands entirely before or entirely after any given drain.
#[derive(Debug, Default)]
pub struct RawInputAccumulator {
    total: Mutex<MotionDelta>,
}

impl RawInputAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signed delta. Callable from any thread.
    #[inline]
    pub fn append(&self, dx: i32, dy: i32) {
        let mut total = self.total.lock();
        *total = total.saturating_add(dx, dy);
    }

    /// Take the accumulated total and reset it to zero in one step
    #[inline]
    pub fn drain_and_reset(&self) -> MotionDelta {
        std::mem::take(&mut *self.total.lock())
    }

    /// Current total without resetting
    pub fn peek(&self) -> MotionDelta {
        *self.total.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_drain_sums_appends() {
        let acc = RawInputAccumulator::new();
        acc.append(3, 0);
        acc.append(-1, 2);
        acc.append(0, 0);

        assert_eq!(acc.drain_and_reset(), MotionDelta::new(2, 2));
        assert_eq!(acc.drain_and_reset(), MotionDelta::ZERO);
    }

    #[test]
    fn test_peek_does_not_reset() {
        let acc = RawInputAccumulator::new();
        acc.append(5, -5);
        assert_eq!(acc.peek(), MotionDelta::new(5, -5));
        assert_eq!(acc.drain_and_reset(), MotionDelta::new(5, -5));
        assert!(acc.peek().is_zero());
    }

    #[test]
    fn test_saturates_instead_of_wrapping() {
        let acc = RawInputAccumulator::new();
        acc.append(i32::MAX, i32::MIN);
        acc.append(10, -10);
        assert_eq!(acc.drain_and_reset(), MotionDelta::new(i32::MAX, i32::MIN));
    }

    #[test]
    fn test_concurrent_appends_not_lost() {
        let acc = Arc::new(RawInputAccumulator::new());
        let producers: Vec<_> = (0..4)
            .map(|_| {
                let acc = Arc::clone(&acc);
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        acc.append(1, -1);
                    }
                })
            })
            .collect();

        let mut drained = MotionDelta::ZERO;
        for _ in 0..100 {
            let d = acc.drain_and_reset();
            drained.dx += d.dx;
            drained.dy += d.dy;
        }
        for p in producers {
            p.join().unwrap();
        }
        let rest = acc.drain_and_reset();
        drained.dx += rest.dx;
        drained.dy += rest.dy;

        assert_eq!(drained, MotionDelta::new(40_000, -40_000));
    }

    proptest! {
        #[test]
        fn prop_drains_partition_appends(
            ops in prop::collection::vec(
                prop_oneof![
                    (-1000i32..1000, -1000i32..1000).prop_map(Some),
                    Just(None),
                ],
                0..200,
            )
        ) {
            let acc = RawInputAccumulator::new();
            let mut pending = (0i32, 0i32);
            for op in ops {
                match op {
                    Some((dx, dy)) => {
                        acc.append(dx, dy);
                        pending.0 += dx;
                        pending.1 += dy;
                    }
                    None => {
                        let drained: (i32, i32) = acc.drain_and_reset().into();
                        prop_assert_eq!(drained, pending);
                        prop_assert!(acc.drain_and_reset().is_zero());
                        pending = (0, 0);
                    }
                }
            }
        }
    }
}
