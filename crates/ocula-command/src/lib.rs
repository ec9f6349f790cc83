//! OCULA Command - Live reconfiguration from another process
//!
//! Commands arrive as `{ id, payload }` messages on the IPC receiving thread.
//! The [`CommandDispatchRegistry`] is filled once at startup and then shared;
//! handlers flip [`ocula_core::BehaviorFlags`] that the frame loop reads.

pub mod command;
pub mod ids;
pub mod registry;

pub use command::*;
pub use ids::*;
pub use registry::*;
