//! OCULA Face - Per-frame eye motion
//!
//! Two per-frame processes turn tracker output into plausible eye motion:
//!
//! - [`BlinkBlendEngine`]: dead-zone remap, squint blend, and an asymmetric
//!   rate limit ("snap shut, ease open") for each eyelid
//! - [`JitterGenerator`]: small smoothed random eye rotations, applied only
//!   while active and while the model has both eye bones
//!
//! Neither blocks or allocates per frame.

pub mod blink;
pub mod jitter;
pub mod tracker;

pub use blink::*;
pub use jitter::*;
pub use tracker::*;
