//! Parallel ensemble engine for cohort.
//!
//! An [`Engine`] owns one slot per trajectory and runs all of them in a single
//! dispatch on a [`Device`] thread pool. Each slot holds its own state, step
//! size, noise stream, and observer, so trajectories never share mutable data
//! and a failure in one leaves the others untouched.
//!
//! # Operations
//!
//! - [`Engine::initialize`] — load initial states, parameters, and configs
//! - [`Engine::transient`] — integrate, keeping only the final state
//! - [`Engine::features`] — integrate through the observers and summarize
//! - [`Engine::trajectory`] — integrate, recording samples on a stride
//! - [`Engine::shift_initial_state`] and [`Engine::shift_time_span`] — continue
//!   from where the last run ended
//! - [`Engine::seed_rng`] — reseed the noise streams
//!
//! # Logging
//!
//! The engine logs through the [`log`] facade: build and initialize details at
//! `debug`, per-run timing at `info`, and failed trajectory counts at `warn`.

mod config;
mod device;
mod engine;
mod error;
mod results;
mod slot;

pub use config::EngineConfig;
pub use device::{Device, DeviceConfig};
pub use engine::Engine;
pub use error::{ConfigError, Error};
pub use results::{FeatureRun, RowStatus, RunReport, Trajectory, TrajectoryRun};
