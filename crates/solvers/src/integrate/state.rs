use crate::{NoiseSource, Stepper};

/// Mutable state of one trajectory.
///
/// The integrator reads `x` as the initial condition, overwrites it with the
/// state at the end of the run, and keeps `dx` and `aux` in sync with `x`.
#[derive(Debug, Clone)]
pub struct State {
    /// Current time.
    pub t: f64,

    /// Current state vector.
    pub x: Vec<f64>,

    /// Drift at `(t, x)`.
    pub dx: Vec<f64>,

    /// Auxiliary outputs at `(t, x)`.
    pub aux: Vec<f64>,

    /// Step size suggested for the next adaptive step.
    pub dt: f64,

    /// Private random stream for noise terms.
    pub noise: NoiseSource,
}

impl State {
    /// Creates a state at time zero with the given initial condition.
    #[must_use]
    pub fn new(x: Vec<f64>, num_aux: usize, dt: f64, noise: NoiseSource) -> Self {
        let n = x.len();
        Self {
            t: 0.0,
            x,
            dx: vec![0.0; n],
            aux: vec![0.0; num_aux],
            dt,
            noise,
        }
    }
}

/// Preallocated scratch buffers for one trajectory.
///
/// Sized once for a stepper and problem shape, then reused for every step so
/// integration never allocates.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub(super) num_vars: usize,
    pub(super) k: Vec<f64>,
    pub(super) stage_x: Vec<f64>,
    pub(super) x_new: Vec<f64>,
    pub(super) stage_aux: Vec<f64>,
    pub(super) z: Vec<f64>,
    pub(super) w: Vec<f64>,
    pub(super) zero_w: Vec<f64>,
}

impl Workspace {
    /// Creates buffers for `stepper` on a problem of the given shape.
    #[must_use]
    pub fn new(stepper: Stepper, num_vars: usize, num_aux: usize, num_noise: usize) -> Self {
        let stages = stepper.tableau().stages();
        Self {
            num_vars,
            k: vec![0.0; stages * num_vars],
            stage_x: vec![0.0; num_vars],
            x_new: vec![0.0; num_vars],
            stage_aux: vec![0.0; num_aux],
            z: vec![0.0; num_noise],
            w: vec![0.0; num_noise],
            zero_w: vec![0.0; num_noise],
        }
    }

    /// Stage derivative `k[stage]`.
    pub(super) fn stage(&self, stage: usize) -> &[f64] {
        let n = self.num_vars;
        &self.k[stage * n..(stage + 1) * n]
    }
}
