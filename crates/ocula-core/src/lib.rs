//! OCULA Core - Fundamental types shared by every OCULA crate
//!
//! This crate defines:
//! - Error types (OculaError, OculaResult)
//! - Rotation primitive used for eye micro-motion
//! - Behavior flags shared between the command thread and the frame loop
//! - The skeleton boundary (bones, rotation sink, load/unload lifecycle)

pub mod error;
pub mod flags;
pub mod rotation;
pub mod skeleton;

pub use error::*;
pub use flags::*;
pub use rotation::*;
pub use skeleton::*;
