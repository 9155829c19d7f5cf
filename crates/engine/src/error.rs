use cohort_core::SystemError;
use thiserror::Error;

/// Errors that abort an engine call before any trajectory is integrated.
///
/// Per-trajectory integration failures are not errors at this level; they are
/// reported per row as [`RowStatus::Failed`](crate::RowStatus::Failed).
#[derive(Debug, Error)]
pub enum Error {
    /// An input buffer does not match the problem or the other buffers.
    #[error("{buffer} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        buffer: &'static str,
        expected: [usize; 2],
        found: [usize; 2],
    },

    /// The system rejected the problem when the engine was built.
    #[error("failed to build system: {0}")]
    Build(#[from] SystemError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A run or query was attempted before [`Engine::initialize`](crate::Engine::initialize).
    #[error("engine is not initialized")]
    NotInitialized,

    #[error("failed to create device: {0}")]
    Device(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to assemble output: {0}")]
    Output(#[from] ndarray::ShapeError),
}

/// Invalid solver or observer configuration.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("solver: {0}")]
    Solver(#[from] cohort_solvers::ConfigError),

    #[error("observer: {0}")]
    Observer(#[from] cohort_observers::ConfigError),
}

impl From<cohort_solvers::ConfigError> for Error {
    fn from(err: cohort_solvers::ConfigError) -> Self {
        Self::Config(err.into())
    }
}

impl From<cohort_observers::ConfigError> for Error {
    fn from(err: cohort_observers::ConfigError) -> Self {
        Self::Config(err.into())
    }
}
