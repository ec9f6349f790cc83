//! OCULA Test Harness - Concurrency stress and frame simulation
//!
//! This crate provides:
//! - Multi-threaded raw input stress against the accumulator
//! - Concurrent command storms against the dispatch registry
//! - A frame simulator driving a full session against a recording model

pub mod command_storm;
pub mod frame_simulator;
pub mod input_stress;
pub mod model;

pub use command_storm::*;
pub use frame_simulator::*;
pub use input_stress::*;
pub use model::*;
