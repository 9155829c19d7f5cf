/// Why a single trajectory could not be integrated across its time span.
///
/// A failure is local to one trajectory; the rest of an ensemble is unaffected.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq)]
pub enum StepFailure {
    #[error("exceeded max_steps before reaching the end of the span (t = {t})")]
    MaxStepsExceeded { t: f64 },

    #[error("state became non-finite at t = {t}")]
    NonFinite { t: f64 },

    #[error("step size {dt} fell below the minimum at t = {t}")]
    StepSizeUnderflow { t: f64, dt: f64 },
}

impl StepFailure {
    /// Time at which integration stopped.
    #[must_use]
    pub fn time(&self) -> f64 {
        match *self {
            Self::MaxStepsExceeded { t }
            | Self::NonFinite { t }
            | Self::StepSizeUnderflow { t, .. } => t,
        }
    }
}
