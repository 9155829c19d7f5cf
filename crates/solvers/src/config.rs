use thiserror::Error;

/// Numeric tuning for trajectory integration.
///
/// Fields are public so configs can be built literally or deserialized; call
/// [`SolverConfig::validate`] (the engine does this on `initialize`) before use.
/// Chained setters are provided for the common overrides.
///
/// # Example
///
/// ```
/// use cohort_solvers::SolverConfig;
///
/// let config = SolverConfig::default().dt(0.01).dtmax(0.5).tolerances(1e-8, 1e-6);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(default))]
pub struct SolverConfig {
    /// Fixed step size, or the initial step size for adaptive steppers.
    pub dt: f64,

    /// Largest step an adaptive stepper may take.
    pub dtmax: f64,

    /// Absolute error tolerance (adaptive steppers).
    pub abstol: f64,

    /// Relative error tolerance (adaptive steppers).
    pub reltol: f64,

    /// Maximum step attempts, accepted plus rejected, in one run.
    pub max_steps: usize,

    /// Maximum samples recorded per trajectory in trajectory mode.
    pub max_store: usize,

    /// Record every `nout`-th accepted step in trajectory mode.
    pub nout: usize,
}

/// Errors that can occur when validating a [`SolverConfig`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("dt must be finite and positive")]
    Dt,

    #[error("dtmax must be finite and at least dt")]
    DtMax,

    #[error("abstol must be finite and non-negative")]
    AbsTol,

    #[error("reltol must be finite and non-negative")]
    RelTol,

    #[error("abstol and reltol cannot both be zero")]
    ZeroTolerance,

    #[error("max_steps must be positive")]
    MaxSteps,

    #[error("max_store must be positive")]
    MaxStore,

    #[error("nout must be positive")]
    Nout,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            dtmax: 1.0,
            abstol: 1e-6,
            reltol: 1e-3,
            max_steps: 10_000_000,
            max_store: 10_000_000,
            nout: 50,
        }
    }
}

impl SolverConfig {
    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::Dt);
        }
        if !self.dtmax.is_finite() || self.dtmax < self.dt {
            return Err(ConfigError::DtMax);
        }
        if !self.abstol.is_finite() || self.abstol < 0.0 {
            return Err(ConfigError::AbsTol);
        }
        if !self.reltol.is_finite() || self.reltol < 0.0 {
            return Err(ConfigError::RelTol);
        }
        if self.abstol == 0.0 && self.reltol == 0.0 {
            return Err(ConfigError::ZeroTolerance);
        }
        if self.max_steps == 0 {
            return Err(ConfigError::MaxSteps);
        }
        if self.max_store == 0 {
            return Err(ConfigError::MaxStore);
        }
        if self.nout == 0 {
            return Err(ConfigError::Nout);
        }
        Ok(())
    }

    /// Sets the fixed or initial step size.
    #[must_use]
    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Sets the maximum adaptive step size.
    #[must_use]
    pub fn dtmax(mut self, dtmax: f64) -> Self {
        self.dtmax = dtmax;
        self
    }

    /// Sets the absolute and relative tolerances.
    #[must_use]
    pub fn tolerances(mut self, abstol: f64, reltol: f64) -> Self {
        self.abstol = abstol;
        self.reltol = reltol;
        self
    }

    /// Sets the step budget for one run.
    #[must_use]
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the trajectory-mode storage limit and output stride.
    #[must_use]
    pub fn storage(mut self, max_store: usize, nout: usize) -> Self {
        self.max_store = max_store;
        self.nout = nout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(SolverConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_step_sizes() {
        let base = SolverConfig::default();

        assert_eq!(base.dt(0.0).validate(), Err(ConfigError::Dt));
        assert_eq!(base.dt(f64::NAN).validate(), Err(ConfigError::Dt));
        assert_eq!(base.dt(2.0).validate(), Err(ConfigError::DtMax));
    }

    #[test]
    fn rejects_bad_tolerances() {
        let base = SolverConfig::default();

        assert_eq!(
            base.tolerances(-1.0, 1e-3).validate(),
            Err(ConfigError::AbsTol)
        );
        assert_eq!(
            base.tolerances(1e-6, f64::INFINITY).validate(),
            Err(ConfigError::RelTol)
        );
        assert_eq!(
            base.tolerances(0.0, 0.0).validate(),
            Err(ConfigError::ZeroTolerance)
        );
    }

    #[test]
    fn rejects_zero_counts() {
        let base = SolverConfig::default();

        assert_eq!(base.max_steps(0).validate(), Err(ConfigError::MaxSteps));
        assert_eq!(base.storage(0, 1).validate(), Err(ConfigError::MaxStore));
        assert_eq!(base.storage(10, 0).validate(), Err(ConfigError::Nout));
    }
}
