/// Indicates how the integrator terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the end of the time span.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// Summary of one successful integration run.
///
/// The integrated state itself lives in the [`State`](super::State) that was
/// passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    /// How the integrator terminated.
    pub status: Status,

    /// Accepted steps.
    pub steps: usize,

    /// Rejected steps (adaptive steppers only).
    pub rejected: usize,

    /// Right-hand side evaluations.
    pub evals: usize,
}
