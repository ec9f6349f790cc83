//! OCULA Runtime - Wiring and the per-frame entry point
//!
//! [`AvatarSession::assemble`] builds every component from a
//! [`RuntimeConfig`] and returns the shared handles the foreign threads need:
//!
//! - the raw mouse monitor, for the OS input callback
//! - the command registry, for the IPC receiving side ([`start_command_loop`])
//! - the behavior flags
//!
//! The host's frame loop then calls [`AvatarSession::tick`] once per frame and
//! forwards model load/unload through [`ocula_core::ModelLifecycle`].

pub mod command_loop;
pub mod config;
pub mod logging;
pub mod session;

pub use command_loop::*;
pub use config::*;
pub use logging::*;
pub use session::*;
