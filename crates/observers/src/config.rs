use cohort_core::ProblemDefinition;
use thiserror::Error;

/// Thresholds and indices controlling feature extraction.
///
/// Fields are public so configs can be built literally or deserialized; the
/// engine calls [`ObserverConfig::validate`] on `initialize`.
///
/// # Example
///
/// ```
/// use cohort_core::ProblemDefinition;
/// use cohort_observers::ObserverConfig;
///
/// let problem = ProblemDefinition::new(["v", "w"], ["a"], Vec::<String>::new(), 0).unwrap();
/// let config = ObserverConfig::default()
///     .event_var(0)
///     .feature_var(1)
///     .thresholds(0.5, 0.1);
///
/// assert!(config.validate(&problem).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(default))]
pub struct ObserverConfig {
    /// Index of the variable whose motion triggers events.
    pub event_var: usize,

    /// Index of the variable whose extent is reported.
    pub feature_var: usize,

    /// Capacity of the event window.
    pub max_event_count: usize,

    /// Smallest amplitude an event may have.
    pub min_x_amp: f64,

    /// Smallest interval between accepted events.
    pub min_imi: f64,

    /// Radius of the recurrence ball around the anchor state.
    pub neighbourhood_radius: f64,

    /// Rising threshold of the event variable.
    pub x_up_thresh: f64,

    /// Re-arming threshold of the event variable.
    pub x_down_thresh: f64,

    /// Derivative above which the feature variable counts as rising.
    pub dx_up_thresh: f64,

    /// Derivative below which the feature variable counts as falling.
    pub dx_down_thresh: f64,

    /// Dead band around zero for derivative comparisons.
    pub eps_dx: f64,
}

/// Errors that can occur when validating an [`ObserverConfig`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("event_var {index} is out of range for {num_vars} variables")]
    EventVar { index: usize, num_vars: usize },

    #[error("feature_var {index} is out of range for {num_vars} variables")]
    FeatureVar { index: usize, num_vars: usize },

    #[error("max_event_count must be positive")]
    MaxEventCount,

    #[error("min_x_amp and min_imi must be finite, and min_imi non-negative")]
    Rejection,

    #[error("neighbourhood_radius must be finite and positive")]
    Radius,

    #[error("x_down_thresh ({down}) must be finite and at most x_up_thresh ({up})")]
    Thresholds { up: f64, down: f64 },

    #[error("dx_down_thresh ({down}) must be finite and at most dx_up_thresh ({up})")]
    DxThresholds { up: f64, down: f64 },

    #[error("eps_dx must be finite and non-negative")]
    EpsDx,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            event_var: 0,
            feature_var: 0,
            max_event_count: 100,
            min_x_amp: 1.0,
            min_imi: 1.0,
            neighbourhood_radius: 0.01,
            x_up_thresh: 0.3,
            x_down_thresh: 0.2,
            dx_up_thresh: 0.0,
            dx_down_thresh: 0.0,
            eps_dx: 1e-7,
        }
    }
}

impl ObserverConfig {
    /// Checks every field against the problem shape.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self, problem: &ProblemDefinition) -> Result<(), ConfigError> {
        let num_vars = problem.num_vars();
        if self.event_var >= num_vars {
            return Err(ConfigError::EventVar {
                index: self.event_var,
                num_vars,
            });
        }
        if self.feature_var >= num_vars {
            return Err(ConfigError::FeatureVar {
                index: self.feature_var,
                num_vars,
            });
        }
        if self.max_event_count == 0 {
            return Err(ConfigError::MaxEventCount);
        }
        if !self.min_x_amp.is_finite() || !self.min_imi.is_finite() || self.min_imi < 0.0 {
            return Err(ConfigError::Rejection);
        }
        if !self.neighbourhood_radius.is_finite() || self.neighbourhood_radius <= 0.0 {
            return Err(ConfigError::Radius);
        }

        let (up, down) = (self.x_up_thresh, self.x_down_thresh);
        if !up.is_finite() || !down.is_finite() || down > up {
            return Err(ConfigError::Thresholds { up, down });
        }

        let (up, down) = (self.dx_up_thresh, self.dx_down_thresh);
        if !up.is_finite() || !down.is_finite() || down > up {
            return Err(ConfigError::DxThresholds { up, down });
        }

        if !self.eps_dx.is_finite() || self.eps_dx < 0.0 {
            return Err(ConfigError::EpsDx);
        }
        Ok(())
    }

    /// Sets the event variable index.
    #[must_use]
    pub fn event_var(mut self, index: usize) -> Self {
        self.event_var = index;
        self
    }

    /// Sets the feature variable index.
    #[must_use]
    pub fn feature_var(mut self, index: usize) -> Self {
        self.feature_var = index;
        self
    }

    /// Sets the event window capacity.
    #[must_use]
    pub fn max_event_count(mut self, count: usize) -> Self {
        self.max_event_count = count;
        self
    }

    /// Sets the minimum amplitude and inter-event interval of accepted events.
    #[must_use]
    pub fn rejection(mut self, min_x_amp: f64, min_imi: f64) -> Self {
        self.min_x_amp = min_x_amp;
        self.min_imi = min_imi;
        self
    }

    /// Sets the rising and re-arming thresholds.
    #[must_use]
    pub fn thresholds(mut self, up: f64, down: f64) -> Self {
        self.x_up_thresh = up;
        self.x_down_thresh = down;
        self
    }

    /// Sets the rising and falling derivative thresholds.
    #[must_use]
    pub fn dx_thresholds(mut self, up: f64, down: f64) -> Self {
        self.dx_up_thresh = up;
        self.dx_down_thresh = down;
        self
    }

    /// Sets the recurrence radius.
    #[must_use]
    pub fn neighbourhood_radius(mut self, radius: f64) -> Self {
        self.neighbourhood_radius = radius;
        self
    }

    /// Sets the derivative dead band.
    #[must_use]
    pub fn eps_dx(mut self, eps: f64) -> Self {
        self.eps_dx = eps;
        self
    }

    /// Returns true if a candidate event is large and late enough to count.
    pub(crate) fn accepts(&self, interval: f64, amplitude: f64) -> bool {
        interval >= self.min_imi && amplitude >= self.min_x_amp
    }
}
