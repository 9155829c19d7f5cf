//! Reference ODE systems with known solutions.

use cohort_core::{OdeSystem, ProblemDefinition, SystemError};
use cohort_engine::{Device, DeviceConfig};

/// Harmonic oscillator `x'' = -ω² x` with angular frequency `p[0]`.
///
/// Started from `(A, 0)` the solution is `x = A cos(ω t)`, so the period is
/// `2π / ω` and the energy `(y² + ω² x²) / 2`, reported as the only auxiliary
/// output, is conserved.
#[derive(Debug, Clone, Copy)]
pub struct Oscillator;

impl Oscillator {
    #[must_use]
    pub fn problem() -> ProblemDefinition {
        ProblemDefinition::new(["x", "y"], ["omega"], ["energy"], 0)
            .expect("oscillator problem is valid")
    }
}

impl OdeSystem for Oscillator {
    fn rhs(&self, _t: f64, x: &[f64], p: &[f64], _w: &[f64], dx: &mut [f64], aux: &mut [f64]) {
        let omega2 = p[0] * p[0];
        dx[0] = x[1];
        dx[1] = -omega2 * x[0];
        aux[0] = 0.5 * (x[1] * x[1] + omega2 * x[0] * x[0]);
    }

    fn prepare(&self, problem: &ProblemDefinition) -> Result<(), SystemError> {
        if problem.num_vars() == 2 && problem.num_params() == 1 && problem.num_aux() == 1 {
            Ok(())
        } else {
            Err(SystemError("oscillator needs 2 variables, 1 parameter, 1 aux".into()))
        }
    }
}

/// Exponential decay `x' = -k x` with rate `p[0]`.
pub fn decay(_t: f64, x: &[f64], p: &[f64], _w: &[f64], dx: &mut [f64], _aux: &mut [f64]) {
    dx[0] = -p[0] * x[0];
}

#[must_use]
pub fn decay_problem() -> ProblemDefinition {
    ProblemDefinition::new(["x"], ["k"], Vec::<String>::new(), 0).expect("decay problem is valid")
}

/// `x' = c x²`, which reaches infinity at `t = 1 / (c x0)` for `c x0 > 0`.
pub fn blow_up(_t: f64, x: &[f64], p: &[f64], _w: &[f64], dx: &mut [f64], _aux: &mut [f64]) {
    dx[0] = p[0] * x[0] * x[0];
}

/// Ornstein–Uhlenbeck process `x' = -θ x + σ w` with `p = [θ, σ]`.
///
/// The stationary variance is `σ² / (2θ)`.
pub fn ornstein_uhlenbeck(
    _t: f64,
    x: &[f64],
    p: &[f64],
    w: &[f64],
    dx: &mut [f64],
    _aux: &mut [f64],
) {
    dx[0] = -p[0] * x[0] + p[1] * w[0];
}

#[must_use]
pub fn ornstein_uhlenbeck_problem() -> ProblemDefinition {
    ProblemDefinition::new(["x"], ["theta", "sigma"], Vec::<String>::new(), 1)
        .expect("OU problem is valid")
}

/// A small device for tests.
#[must_use]
pub fn device() -> Device {
    Device::new(DeviceConfig { threads: 4 }).expect("thread pool should build")
}
