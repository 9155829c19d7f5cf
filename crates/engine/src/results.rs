use std::time::Duration;

use cohort_solvers::StepFailure;
use ndarray::Array2;

/// Outcome of one trajectory in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum RowStatus {
    /// Not run since the last `initialize`.
    #[default]
    Pending,

    /// Reached the end of the time span.
    Complete,

    /// Stopped before the end of the time span.
    Failed(StepFailure),
}

impl RowStatus {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Summary of a run without outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Status of each trajectory, in input row order.
    pub status: Vec<RowStatus>,

    /// Wall-clock time of the dispatch.
    pub elapsed: Duration,
}

impl RunReport {
    /// Number of trajectories that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        count_failed(&self.status)
    }
}

/// Output of a feature run.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRun {
    /// Features, one row per trajectory; rows of failed trajectories are NaN.
    pub values: Array2<f64>,

    /// State at the end of the run, one row per trajectory.
    pub final_state: Array2<f64>,

    /// Status of each trajectory, in input row order.
    pub status: Vec<RowStatus>,
}

impl FeatureRun {
    #[must_use]
    pub fn failed(&self) -> usize {
        count_failed(&self.status)
    }
}

/// Samples recorded along one trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// Sample times.
    pub t: Vec<f64>,

    /// State at each sample, one row per sample.
    pub x: Array2<f64>,

    /// Drift at each sample.
    pub dx: Array2<f64>,

    /// Auxiliary outputs at each sample.
    pub aux: Array2<f64>,
}

impl Trajectory {
    /// Number of recorded samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// Output of a trajectory run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryRun {
    /// Recorded samples, in input row order.
    pub trajectories: Vec<Trajectory>,

    /// Status of each trajectory, in input row order.
    pub status: Vec<RowStatus>,
}

fn count_failed(status: &[RowStatus]) -> usize {
    status.iter().filter(|s| s.is_failed()).count()
}
