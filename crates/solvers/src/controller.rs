/// Step-size controller for adaptive steppers.
///
/// Uses an I-controller on the scaled error norm:
///
/// ```text
/// h_new = h * clamp(safety * err^(-1 / (q + 1)), min_factor, max_factor)
/// ```
///
/// where `q` is the order of the embedded solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepController {
    /// Safety factor applied to the optimal step.
    pub safety: f64,

    /// Lower bound on the shrink factor, so a bad step cannot stall the run.
    pub min_factor: f64,

    /// Upper bound on the growth factor, so step size cannot oscillate.
    pub max_factor: f64,

    exponent: f64,
}

impl StepController {
    /// Creates a controller for a method whose embedded solution has order `q`.
    #[must_use]
    pub fn for_embedded_order(q: u32) -> Self {
        Self {
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 5.0,
            exponent: 1.0 / f64::from(q + 1),
        }
    }

    /// Returns the factor to scale the current step by.
    ///
    /// A zero error gives the maximum growth. A non-finite error gives the
    /// maximum shrink.
    #[must_use]
    pub fn factor(&self, error: f64) -> f64 {
        if !error.is_finite() {
            return self.min_factor;
        }
        if error == 0.0 {
            return self.max_factor;
        }
        let factor = self.safety * error.powf(-self.exponent);
        factor.clamp(self.min_factor, self.max_factor)
    }
}
