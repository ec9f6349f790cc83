//! OCULA Input - Raw pointer motion captured on a foreign thread
//!
//! The OS delivers raw mouse packets on its own callback thread at device
//! polling rate. They are summed into a [`RawInputAccumulator`] and the frame
//! loop drains the total once per tick.

pub mod accumulator;
pub mod mouse;

pub use accumulator::*;
pub use mouse::*;
