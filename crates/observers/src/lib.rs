//! Streaming feature observers for cohort trajectories.
//!
//! An observer consumes every accepted step of one trajectory and reduces it
//! to a fixed-length feature vector, without storing the time series. The
//! variants are listed by [`ObserverKind`], and [`ObserverState`] holds the
//! per-trajectory state of any of them.
//!
//! # Event features
//!
//! The event-based kinds share one layout (see
//! [`ObserverKind::feature_names`]). Statistics come from a bounded window of
//! the most recent `max_event_count` events; a statistic without enough
//! events reports [`INSUFFICIENT_DATA`].

mod basic;
mod config;
mod derivative;
mod kind;
mod neighbourhood;
mod state;
mod tally;
mod threshold;

pub mod events;
pub mod stats;

use cohort_solvers::integrate::Event;

pub use basic::{Basic, BasicAll};
pub use config::{ConfigError, ObserverConfig};
pub use derivative::{Direction, LocalMaxima};
pub use kind::{ObserverKind, ParseObserverError};
pub use neighbourhood::{Neighbourhood, Recurrence};
pub use state::ObserverState;
pub use stats::INSUFFICIENT_DATA;
pub use threshold::{Phase, ThresholdCrossing};

/// Per-trajectory reduction of integrator events to features.
pub trait FeatureObserver {
    /// Updates the state with one accepted point.
    fn consume(&mut self, event: &Event<'_>);

    /// Writes the feature vector into `out`.
    ///
    /// `out` must hold [`ObserverKind::num_features`] values. Summarizing
    /// leaves the state untouched, so consuming can continue afterwards as if
    /// it had never been called.
    fn summarize(&self, out: &mut [f64]);

    /// Returns to the freshly-created state, keeping allocations.
    fn reset(&mut self);
}
