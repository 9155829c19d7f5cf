use thiserror::Error;

use crate::ProblemDefinition;

/// Error returned by [`OdeSystem::prepare`] when a system rejects a problem.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("system rejected problem: {0}")]
pub struct SystemError(pub String);

/// The right-hand side of an ODE system.
///
/// `rhs` receives the time `t`, state `x`, parameters `p`, and per-step noise
/// terms `w`, and writes the time derivative into `dx` and auxiliary outputs
/// into `aux`. Buffer lengths always match the [`ProblemDefinition`] the engine
/// was built with; `w` is empty when the problem has no noise terms.
///
/// Implementations are shared across worker threads and must not keep mutable
/// state between calls.
///
/// Closures with the matching signature implement this trait.
///
/// # Example
///
/// ```
/// use cohort_core::OdeSystem;
///
/// // Harmonic oscillator with angular frequency p[0].
/// let system = |_t: f64, x: &[f64], p: &[f64], _w: &[f64], dx: &mut [f64], _aux: &mut [f64]| {
///     dx[0] = x[1];
///     dx[1] = -p[0] * p[0] * x[0];
/// };
///
/// let mut dx = [0.0; 2];
/// system.rhs(0.0, &[1.0, 0.0], &[2.0], &[], &mut dx, &mut []);
/// assert_eq!(dx, [0.0, -4.0]);
/// ```
pub trait OdeSystem: Sync {
    /// Evaluates `dx/dt` and auxiliary outputs.
    fn rhs(&self, t: f64, x: &[f64], p: &[f64], w: &[f64], dx: &mut [f64], aux: &mut [f64]);

    /// Checks that this system can run the given problem.
    ///
    /// Called once when an engine is built, before any run. The default
    /// implementation accepts every problem.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError`] if the system cannot serve the problem, for
    /// example when it expects a different number of variables.
    fn prepare(&self, _problem: &ProblemDefinition) -> Result<(), SystemError> {
        Ok(())
    }
}

impl<F> OdeSystem for F
where
    F: Fn(f64, &[f64], &[f64], &[f64], &mut [f64], &mut [f64]) + Sync,
{
    fn rhs(&self, t: f64, x: &[f64], p: &[f64], w: &[f64], dx: &mut [f64], aux: &mut [f64]) {
        self(t, x, p, w, dx, aux);
    }
}
