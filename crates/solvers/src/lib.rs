//! Steppers and the per-trajectory integrator for cohort.
//!
//! # Modules
//!
//! - [`integrate`] — advances one trajectory across a time span with any
//!   [`Stepper`], emitting an event per accepted step
//! - [`tableau`] — Butcher tableaux backing each stepper
//!
//! # Steppers
//!
//! | Stepper                          | Adaptive | Order |
//! |----------------------------------|----------|-------|
//! | [`Stepper::Euler`]               | no       | 1     |
//! | [`Stepper::Heun`]                | no       | 2     |
//! | [`Stepper::Rk4`]                 | no       | 4     |
//! | [`Stepper::HeunEuler`]           | yes      | 2(1)  |
//! | [`Stepper::BogackiShampine23`]   | yes      | 3(2)  |
//! | [`Stepper::DormandPrince5`]      | yes      | 5(4)  |

mod config;
mod controller;
mod noise;
mod stepper;

pub mod integrate;
pub mod tableau;

pub use config::{ConfigError, SolverConfig};
pub use controller::StepController;
pub use integrate::{Integrator, StepFailure};
pub use noise::NoiseSource;
pub use stepper::{ParseStepperError, Stepper};
pub use tableau::Tableau;
