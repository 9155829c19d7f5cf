//! Core traits and types for cohort.
//!
//! This crate defines the shared abstractions that steppers, observers, and
//! the ensemble engine build on:
//!
//! - [`ProblemDefinition`] — names and sizes describing an ODE system
//! - [`OdeSystem`] — the right-hand side `f(t, x, p, w) -> (dx/dt, aux)`
//! - [`TimeSpan`] — the integration window of one run
//! - [`Precision`] — storage precision of trajectory state
//! - [`Observer`] — receives integrator events and optionally returns control actions

mod observer;
mod precision;
mod problem;
mod span;
mod system;

pub use observer::Observer;
pub use precision::{ParsePrecisionError, Precision};
pub use problem::{ProblemDefinition, ProblemError};
pub use span::{TimeSpan, TimeSpanError};
pub use system::{OdeSystem, SystemError};
