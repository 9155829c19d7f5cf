//! Per-trajectory integration with any [`Stepper`].
//!
//! [`Integrator::integrate`] advances one trajectory across a [`TimeSpan`]:
//!
//! ```text
//! k_1 = f(t, x, w)
//! k_s = f(t + c_s h, x + h Σ a_sj k_j, w)      s = 2..S
//! x_{n+1} = x_n + h Σ b_s k_s
//! ```
//!
//! Fixed-step tableaux advance on the grid `start + n * dt`, shortening the
//! final step to land exactly on `end`. Adaptive tableaux accept a step when
//! the infinity norm of
//!
//! ```text
//! h Σ (b_s - b̂_s) k_s / (abstol + reltol * max(|x_n|, |x_{n+1}|))
//! ```
//!
//! is at most one, and rescale `h` with a [`StepController`] otherwise.
//!
//! # Noise
//!
//! When the system has noise terms, each step draws standard normals `z` from
//! the trajectory's [`NoiseSource`] and passes `w = z / sqrt(h)` to every
//! stage, so an Euler step adds `σ z sqrt(h)` (Euler–Maruyama). A rejected
//! step keeps its draw.
//!
//! # Observer
//!
//! The observer receives an [`Event`] for the initial point and after each
//! accepted step, and may return [`Action::StopEarly`] to end the run.

mod action;
mod error;
mod event;
mod solution;
mod state;


pub use action::Action;
pub use error::StepFailure;
pub use event::Event;
pub use solution::{Solution, Status};
pub use state::{State, Workspace};

use cohort_core::{OdeSystem, Observer, Precision, TimeSpan};

use crate::{SolverConfig, StepController, Stepper, Tableau};

/// Steps trajectories with one stepper, config, and storage precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integrator {
    stepper: Stepper,
    config: SolverConfig,
    precision: Precision,
    controller: StepController,
}

impl Integrator {
    /// Creates an integrator.
    ///
    /// The config is expected to have passed [`SolverConfig::validate`].
    #[must_use]
    pub fn new(stepper: Stepper, config: SolverConfig, precision: Precision) -> Self {
        let controller = StepController::for_embedded_order(stepper.tableau().embedded_order);
        Self {
            stepper,
            config,
            precision,
            controller,
        }
    }

    #[must_use]
    pub fn stepper(&self) -> Stepper {
        self.stepper
    }

    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Integrates `state.x` from `span.start()` to `span.end()`.
    ///
    /// On success `state` holds the final time, state, drift, and auxiliary
    /// outputs, and `state.dt` the step size suggested for a following run.
    /// On failure `state` holds the last accepted point.
    ///
    /// # Errors
    ///
    /// Returns a [`StepFailure`] if the step budget runs out, the state becomes
    /// non-finite, or an adaptive step shrinks below the minimum step size.
    pub fn integrate<S, Obs>(
        &self,
        system: &S,
        params: &[f64],
        span: TimeSpan,
        state: &mut State,
        ws: &mut Workspace,
        mut observer: Obs,
    ) -> Result<Solution, StepFailure>
    where
        S: OdeSystem + ?Sized,
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        let tableau = self.stepper.tableau();
        let adaptive = tableau.is_adaptive();
        let has_noise = !ws.z.is_empty();
        let (t0, tf) = (span.start(), span.end());

        state.t = t0;
        system.rhs(t0, &state.x, params, &ws.zero_w, &mut state.dx, &mut state.aux);
        self.precision.round_slice(&mut state.dx);
        self.precision.round_slice(&mut state.aux);
        let mut evals = 1;

        if !all_finite(&state.x) {
            return Err(StepFailure::NonFinite { t: t0 });
        }

        let mut solution = Solution {
            status: Status::Complete,
            steps: 0,
            rejected: 0,
            evals,
        };

        let initial = Event {
            step: 0,
            t: t0,
            dt: 0.0,
            x: &state.x,
            dx: &state.dx,
            aux: &state.aux,
        };
        if let Some(Action::StopEarly) = observer.observe(&initial) {
            solution.status = Status::StoppedByObserver;
            return Ok(solution);
        }

        if span.duration() <= 0.0 {
            return Ok(solution);
        }

        let scale = t0.abs().max(tf.abs()).max(span.duration());
        let dt_min = 16.0 * f64::EPSILON * scale;

        let mut h = if adaptive {
            let suggested = if state.dt.is_finite() && state.dt > 0.0 {
                state.dt
            } else {
                self.config.dt
            };
            suggested.clamp(dt_min, self.config.dtmax)
        } else {
            self.config.dt
        };

        let mut attempts = 0;
        let mut accepted = 0;
        let mut rejected = 0;
        let mut after_reject = false;
        let mut noise_drawn = false;
        let mut reached_end = false;

        // Loop on the landing flag, since single-precision rounding of `t`
        // may leave it just short of `tf`.
        while !reached_end {
            if attempts >= self.config.max_steps {
                return Err(StepFailure::MaxStepsExceeded { t: state.t });
            }
            attempts += 1;

            // Target time of this attempt.
            let (t_next, truncated) = if adaptive {
                if state.t + h >= tf - dt_min {
                    (tf, true)
                } else {
                    (state.t + h, false)
                }
            } else {
                #[allow(clippy::cast_precision_loss)]
                let planned = t0 + (accepted + 1) as f64 * self.config.dt;
                if planned >= tf - dt_min {
                    (tf, true)
                } else {
                    (planned, false)
                }
            };
            let step = t_next - state.t;

            if has_noise {
                if !noise_drawn {
                    state.noise.fill_standard_normal(&mut ws.z);
                    noise_drawn = true;
                }
                let inv_sqrt = step.sqrt().recip();
                for (w, z) in ws.w.iter_mut().zip(&ws.z) {
                    *w = z * inv_sqrt;
                }
            }

            let reuse_k1 = !has_noise;
            evals += stages(tableau, system, params, state, step, ws, reuse_k1);
            combine(tableau.b, &state.x, step, ws);

            if let Some(b_hat) = tableau.b_hat {
                let err = self.error_norm(tableau.b, b_hat, &state.x, step, ws);
                if err.is_nan() || err > 1.0 {
                    rejected += 1;
                    after_reject = true;
                    h = step * self.controller.factor(err).min(1.0);
                    if h < dt_min {
                        return Err(if err.is_finite() {
                            StepFailure::StepSizeUnderflow { t: state.t, dt: h }
                        } else {
                            StepFailure::NonFinite { t: state.t }
                        });
                    }
                    continue;
                }

                let mut factor = self.controller.factor(err);
                if after_reject {
                    factor = factor.min(1.0);
                }
                after_reject = false;
                if !truncated {
                    h = (step * factor).clamp(dt_min, self.config.dtmax);
                }
            }

            // Accept.
            state.x.copy_from_slice(&ws.x_new);
            state.t = self.precision.round(t_next);
            self.precision.round_slice(&mut state.x);
            accepted += 1;
            noise_drawn = false;
            reached_end = truncated;

            if !all_finite(&state.x) {
                return Err(StepFailure::NonFinite { t: state.t });
            }

            let fsal_reuse = tableau.fsal && !has_noise && self.precision == Precision::Double;
            if fsal_reuse {
                let last = ws.stage(tableau.stages() - 1);
                state.dx.copy_from_slice(last);
                state.aux.copy_from_slice(&ws.stage_aux);
            } else {
                system.rhs(
                    state.t,
                    &state.x,
                    params,
                    &ws.zero_w,
                    &mut state.dx,
                    &mut state.aux,
                );
                evals += 1;
                self.precision.round_slice(&mut state.dx);
                self.precision.round_slice(&mut state.aux);
            }

            let event = Event {
                step: accepted,
                t: state.t,
                dt: step,
                x: &state.x,
                dx: &state.dx,
                aux: &state.aux,
            };
            if let Some(Action::StopEarly) = observer.observe(&event) {
                solution.status = Status::StoppedByObserver;
                break;
            }
        }

        if adaptive {
            state.dt = h;
        }

        solution.steps = accepted;
        solution.rejected = rejected;
        solution.evals = evals;
        Ok(solution)
    }

    /// Infinity norm of the scaled embedded error estimate.
    ///
    /// Returns NaN if any component is NaN.
    fn error_norm(
        &self,
        b: &[f64],
        b_hat: &[f64],
        x: &[f64],
        step: f64,
        ws: &Workspace,
    ) -> f64 {
        let mut err: f64 = 0.0;
        for i in 0..ws.num_vars {
            let mut acc = 0.0;
            for (s, (bs, bh)) in b.iter().zip(b_hat).enumerate() {
                let e = bs - bh;
                if e != 0.0 {
                    acc += e * ws.stage(s)[i];
                }
            }
            let e = step * acc;
            let scale = self.config.abstol + self.config.reltol * x[i].abs().max(ws.x_new[i].abs());
            let ratio = if e == 0.0 { 0.0 } else { (e / scale).abs() };
            if ratio.is_nan() || ratio > err {
                err = ratio;
            }
        }
        err
    }
}

/// Evaluates every stage into `ws.k`, returning the number of evaluations.
///
/// With `reuse_k1`, the first stage is taken from `state.dx`, which holds the
/// noise-free drift at the current point.
fn stages<S: OdeSystem + ?Sized>(
    tableau: &Tableau,
    system: &S,
    params: &[f64],
    state: &State,
    h: f64,
    ws: &mut Workspace,
    reuse_k1: bool,
) -> usize {
    let n = ws.num_vars;
    let mut evals = 0;

    if reuse_k1 {
        ws.k[..n].copy_from_slice(&state.dx);
    } else {
        system.rhs(
            state.t,
            &state.x,
            params,
            &ws.w,
            &mut ws.k[..n],
            &mut ws.stage_aux,
        );
        evals += 1;
    }

    for s in 1..tableau.stages() {
        let row = tableau.a[s];
        for i in 0..n {
            let mut acc = 0.0;
            for (j, a) in row.iter().enumerate() {
                if *a != 0.0 {
                    acc += a * ws.k[j * n + i];
                }
            }
            ws.stage_x[i] = state.x[i] + h * acc;
        }
        let t = state.t + tableau.c[s] * h;
        system.rhs(
            t,
            &ws.stage_x,
            params,
            &ws.w,
            &mut ws.k[s * n..(s + 1) * n],
            &mut ws.stage_aux,
        );
        evals += 1;
    }

    evals
}

/// Writes `x + h Σ b_s k_s` into `ws.x_new`.
fn combine(b: &[f64], x: &[f64], h: f64, ws: &mut Workspace) {
    let n = ws.num_vars;
    for i in 0..n {
        let mut acc = 0.0;
        for (s, bs) in b.iter().enumerate() {
            if *bs != 0.0 {
                acc += bs * ws.k[s * n + i];
            }
        }
        ws.x_new[i] = x[i] + h * acc;
    }
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}
