use std::time::Instant;

use cohort_core::{OdeSystem, ProblemDefinition, TimeSpan};
use cohort_observers::{ObserverConfig, ObserverState};
use cohort_solvers::{
    Integrator, NoiseSource, SolverConfig,
    integrate::{State, Workspace},
};
use log::{debug, info, warn};
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

use crate::{
    Device, EngineConfig, Error, FeatureRun, RowStatus, RunReport, Trajectory, TrajectoryRun,
    slot::{Recording, Run, Slot},
};

/// Runs ensembles of trajectories of one ODE system in parallel.
///
/// The problem, system, stepper, observer kind, precision, and device are
/// fixed when the engine is built. [`Engine::initialize`] loads an ensemble;
/// the run operations then integrate every trajectory from its initial state
/// across the current time span, each trajectory in its own slot.
///
/// Every run starts each trajectory at the start of the span from its stored
/// initial state. Use [`Engine::shift_initial_state`] and
/// [`Engine::shift_time_span`] to continue a trajectory instead of repeating
/// the same window.
///
/// # Example
///
/// ```
/// use cohort_core::{ProblemDefinition, TimeSpan};
/// use cohort_engine::{Device, DeviceConfig, Engine, EngineConfig};
/// use cohort_observers::ObserverConfig;
/// use cohort_solvers::SolverConfig;
/// use ndarray::array;
///
/// let problem = ProblemDefinition::new(["x"], ["k"], Vec::<String>::new(), 0).unwrap();
/// let decay = |_t: f64, x: &[f64], p: &[f64], _w: &[f64], dx: &mut [f64], _aux: &mut [f64]| {
///     dx[0] = -p[0] * x[0];
/// };
///
/// let device = Device::new(DeviceConfig::default()).unwrap();
/// let config = EngineConfig {
///     observer: "basic".parse().unwrap(),
///     ..EngineConfig::default()
/// };
/// let mut engine = Engine::new(device, problem, decay, config).unwrap();
///
/// engine
///     .initialize(
///         TimeSpan::new(0.0, 1.0).unwrap(),
///         array![[1.0], [2.0]].view(),
///         array![[1.0], [0.5]].view(),
///         SolverConfig::default().dt(0.01),
///         ObserverConfig::default(),
///     )
///     .unwrap();
///
/// let run = engine.features(true).unwrap();
/// assert_eq!(run.values.dim(), (2, engine.feature_names().len()));
/// assert!((run.final_state[[0, 0]] - (-1.0_f64).exp()).abs() < 1e-8);
/// ```
#[derive(Debug)]
pub struct Engine<S> {
    device: Device,
    problem: ProblemDefinition,
    system: S,
    config: EngineConfig,
    feature_names: Vec<String>,
    ensemble: Option<Ensemble>,
}

/// State loaded by `initialize`.
#[derive(Debug)]
struct Ensemble {
    span: TimeSpan,
    solver: SolverConfig,
    observer: ObserverConfig,
    integrator: Integrator,
    slots: Vec<Slot>,
    observer_ready: bool,
}

impl<S: OdeSystem> Engine<S> {
    /// Builds an engine for `system` on `problem`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Build`] if the system rejects the problem.
    pub fn new(
        device: Device,
        problem: ProblemDefinition,
        system: S,
        config: EngineConfig,
    ) -> Result<Self, Error> {
        system.prepare(&problem)?;
        let feature_names = config.observer.feature_names(&problem);

        debug!(
            "built engine: {} variables, {} parameters, {} {} {}, {} threads",
            problem.num_vars(),
            problem.num_params(),
            config.stepper,
            config.observer,
            config.precision,
            device.threads(),
        );

        Ok(Self {
            device,
            problem,
            system,
            config,
            feature_names,
            ensemble: None,
        })
    }

    /// Loads an ensemble.
    ///
    /// Row `i` of `x0` and `params` describes trajectory `i`; the views may
    /// use any memory layout. Replaces any previously loaded ensemble, resets
    /// every step size and observer, and seeds each noise stream from the
    /// engine seed and the row index. Loading the same number of trajectories
    /// again reuses the existing buffers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if a buffer has the wrong number of
    /// columns or the row counts differ, and [`Error::Config`] if a config is
    /// invalid. The engine is left unchanged on error.
    pub fn initialize(
        &mut self,
        span: TimeSpan,
        x0: ArrayView2<'_, f64>,
        params: ArrayView2<'_, f64>,
        solver: SolverConfig,
        observer: ObserverConfig,
    ) -> Result<(), Error> {
        let n = x0.nrows();
        check_shape("x0", x0.dim(), (n, self.problem.num_vars()))?;
        check_shape("params", params.dim(), (n, self.problem.num_params()))?;
        solver.validate()?;
        observer.validate(&self.problem)?;

        let stepper = self.config.stepper;
        let precision = self.config.precision;
        let integrator = Integrator::new(stepper, solver, precision);
        let (num_vars, num_aux, num_noise) = (
            self.problem.num_vars(),
            self.problem.num_aux(),
            self.problem.num_noise(),
        );

        let (seed, kind) = (self.config.seed, self.config.observer);
        let rows = x0.rows().into_iter().zip(params.rows());

        let slots = match self.ensemble.take() {
            Some(previous) if previous.slots.len() == n => {
                let same_observer = previous.observer == observer;
                let mut slots = previous.slots;
                for (i, (slot, (x0, p))) in slots.iter_mut().zip(rows).enumerate() {
                    let tracker = (!same_observer)
                        .then(|| ObserverState::new(kind, &observer, &self.problem));
                    let noise = NoiseSource::for_trajectory(seed, i);
                    slot.reload(x0, p, precision, solver.dt, noise, tracker);
                }
                slots
            }
            _ => rows
                .enumerate()
                .map(|(i, (x0, p))| {
                    let mut x0 = x0.to_vec();
                    let mut p = p.to_vec();
                    precision.round_slice(&mut x0);
                    precision.round_slice(&mut p);

                    let noise = NoiseSource::for_trajectory(seed, i);
                    let state = State::new(x0.clone(), num_aux, solver.dt, noise);
                    let ws = Workspace::new(stepper, num_vars, num_aux, num_noise);
                    let tracker = ObserverState::new(kind, &observer, &self.problem);
                    Slot::new(x0, p, state, ws, tracker)
                })
                .collect(),
        };

        self.ensemble = Some(Ensemble {
            span,
            solver,
            observer,
            integrator,
            slots,
            observer_ready: false,
        });

        debug!(
            "initialized {n} trajectories over [{}, {}] with {stepper}, observer {}",
            span.start(),
            span.end(),
            self.config.observer,
        );
        Ok(())
    }

    /// Integrates every trajectory from its initial state, keeping only the
    /// final state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before [`Engine::initialize`].
    pub fn transient(&mut self) -> Result<RunReport, Error> {
        let ensemble = self.ensemble.as_mut().ok_or(Error::NotInitialized)?;
        let run = Run {
            integrator: ensemble.integrator,
            system: &self.system,
            span: ensemble.span,
            precision: self.config.precision,
        };

        let started = Instant::now();
        let status: Vec<RowStatus> = self.device.install(|| {
            ensemble
                .slots
                .par_iter_mut()
                .map(|slot| slot.transient(&run))
                .collect()
        });
        let elapsed = started.elapsed();

        log_run("transient", &status, elapsed.as_secs_f64());
        Ok(RunReport { status, elapsed })
    }

    /// Integrates every trajectory from its initial state through its
    /// observer and returns the features.
    ///
    /// Observers are reset first when `reinitialize_observer` is true or they
    /// have not run since [`Engine::initialize`]; otherwise they keep
    /// accumulating across runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before [`Engine::initialize`].
    pub fn features(&mut self, reinitialize_observer: bool) -> Result<FeatureRun, Error> {
        let num_features = self.feature_names.len();
        let num_vars = self.problem.num_vars();
        let ensemble = self.ensemble.as_mut().ok_or(Error::NotInitialized)?;
        let reset = reinitialize_observer || !ensemble.observer_ready;
        let run = Run {
            integrator: ensemble.integrator,
            system: &self.system,
            span: ensemble.span,
            precision: self.config.precision,
        };

        let n = ensemble.slots.len();
        let mut values = vec![0.0; n * num_features];

        let started = Instant::now();
        let status: Vec<RowStatus> = self.device.install(|| {
            ensemble
                .slots
                .par_iter_mut()
                .zip(values.par_chunks_mut(num_features))
                .map(|(slot, out)| slot.features(&run, reset, out))
                .collect()
        });
        ensemble.observer_ready = true;

        log_run("features", &status, started.elapsed().as_secs_f64());

        let final_state = gather(&ensemble.slots, num_vars, |slot| &slot.state.x)?;
        Ok(FeatureRun {
            values: Array2::from_shape_vec((n, num_features), values)?,
            final_state,
            status,
        })
    }

    /// Integrates every trajectory from its initial state, recording the
    /// initial point and every `nout`-th accepted step, up to `max_store`
    /// samples per trajectory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before [`Engine::initialize`].
    pub fn trajectory(&mut self) -> Result<TrajectoryRun, Error> {
        let (num_vars, num_aux) = (self.problem.num_vars(), self.problem.num_aux());
        let ensemble = self.ensemble.as_mut().ok_or(Error::NotInitialized)?;
        let (max_store, nout) = (ensemble.solver.max_store, ensemble.solver.nout);
        let run = Run {
            integrator: ensemble.integrator,
            system: &self.system,
            span: ensemble.span,
            precision: self.config.precision,
        };

        let started = Instant::now();
        let (status, recordings): (Vec<RowStatus>, Vec<Recording>) = self.device.install(|| {
            ensemble
                .slots
                .par_iter_mut()
                .map(|slot| slot.trajectory(&run, max_store, nout))
                .unzip()
        });

        log_run("trajectory", &status, started.elapsed().as_secs_f64());

        let trajectories = recordings
            .into_iter()
            .map(|rec| {
                let samples = rec.t.len();
                Ok(Trajectory {
                    x: Array2::from_shape_vec((samples, num_vars), rec.x)?,
                    dx: Array2::from_shape_vec((samples, num_vars), rec.dx)?,
                    aux: Array2::from_shape_vec((samples, num_aux), rec.aux)?,
                    t: rec.t,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(TrajectoryRun {
            trajectories,
            status,
        })
    }

    /// Makes each trajectory's final state its initial state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before [`Engine::initialize`].
    pub fn shift_initial_state(&mut self) -> Result<(), Error> {
        let ensemble = self.ensemble.as_mut().ok_or(Error::NotInitialized)?;
        for slot in &mut ensemble.slots {
            slot.x0.copy_from_slice(&slot.state.x);
        }
        Ok(())
    }

    /// Advances the time span to the next window of equal length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before [`Engine::initialize`].
    pub fn shift_time_span(&mut self) -> Result<(), Error> {
        let ensemble = self.ensemble.as_mut().ok_or(Error::NotInitialized)?;
        ensemble.span = ensemble.span.shifted();
        Ok(())
    }

    /// Reseeds every noise stream, and the streams of later ensembles.
    pub fn seed_rng(&mut self, seed: u64) {
        self.config.seed = seed;
        if let Some(ensemble) = &mut self.ensemble {
            for (i, slot) in ensemble.slots.iter_mut().enumerate() {
                slot.reseed(NoiseSource::for_trajectory(seed, i));
            }
        }
        debug!("reseeded noise streams with {seed}");
    }

    /// Ordered feature names; fixed for the lifetime of the engine.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    #[must_use]
    pub fn problem(&self) -> &ProblemDefinition {
        &self.problem
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Number of loaded trajectories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ensemble.as_ref().map_or(0, |e| e.slots.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current time span.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before [`Engine::initialize`].
    pub fn time_span(&self) -> Result<TimeSpan, Error> {
        Ok(self.loaded()?.span)
    }

    /// Initial states, one row per trajectory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before [`Engine::initialize`].
    pub fn initial_state(&self) -> Result<Array2<f64>, Error> {
        gather(&self.loaded()?.slots, self.problem.num_vars(), |slot| &slot.x0)
    }

    /// States at the end of the last run, one row per trajectory.
    ///
    /// Before any run these equal the initial states. A failed trajectory
    /// holds its last accepted state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before [`Engine::initialize`].
    pub fn final_state(&self) -> Result<Array2<f64>, Error> {
        gather(&self.loaded()?.slots, self.problem.num_vars(), |slot| &slot.state.x)
    }

    /// Auxiliary outputs at the end of the last run, one row per trajectory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before [`Engine::initialize`].
    pub fn final_aux(&self) -> Result<Array2<f64>, Error> {
        gather(&self.loaded()?.slots, self.problem.num_aux(), |slot| &slot.state.aux)
    }

    /// Status of each trajectory in the last run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before [`Engine::initialize`].
    pub fn status(&self) -> Result<Vec<RowStatus>, Error> {
        Ok(self.loaded()?.slots.iter().map(|slot| slot.status).collect())
    }

    fn loaded(&self) -> Result<&Ensemble, Error> {
        self.ensemble.as_ref().ok_or(Error::NotInitialized)
    }
}

fn check_shape(
    buffer: &'static str,
    found: (usize, usize),
    expected: (usize, usize),
) -> Result<(), Error> {
    if found == expected {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            buffer,
            expected: [expected.0, expected.1],
            found: [found.0, found.1],
        })
    }
}

/// Stacks one row per slot into a trajectory-major matrix.
fn gather<F>(slots: &[Slot], width: usize, row: F) -> Result<Array2<f64>, Error>
where
    F: Fn(&Slot) -> &Vec<f64>,
{
    let mut flat = Vec::with_capacity(slots.len() * width);
    for slot in slots {
        flat.extend_from_slice(row(slot));
    }
    Ok(Array2::from_shape_vec((slots.len(), width), flat)?)
}

fn log_run(operation: &str, status: &[RowStatus], seconds: f64) {
    let failed = status.iter().filter(|s| s.is_failed()).count();
    info!(
        "{operation}: {} trajectories in {:.1} ms",
        status.len(),
        seconds * 1e3
    );
    if failed > 0 {
        warn!("{operation}: {failed} of {} trajectories failed", status.len());
    }
}
