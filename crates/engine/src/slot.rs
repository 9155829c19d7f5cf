use cohort_core::{OdeSystem, Precision, TimeSpan};
use cohort_observers::{FeatureObserver, ObserverState};
use cohort_solvers::{
    Integrator, NoiseSource, StepFailure,
    integrate::{Action, Event, Solution, State, Workspace},
};
use ndarray::ArrayView1;

use crate::RowStatus;

/// Shared, read-only inputs of one dispatch.
pub(crate) struct Run<'a, S: ?Sized> {
    pub(crate) integrator: Integrator,
    pub(crate) system: &'a S,
    pub(crate) span: TimeSpan,
    pub(crate) precision: Precision,
}

/// Everything one trajectory owns between runs.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) x0: Vec<f64>,
    params: Vec<f64>,
    pub(crate) state: State,
    ws: Workspace,
    observer: ObserverState,
    pub(crate) status: RowStatus,
}

/// Flat sample buffers filled by a trajectory run.
#[derive(Debug, Default)]
pub(crate) struct Recording {
    pub(crate) t: Vec<f64>,
    pub(crate) x: Vec<f64>,
    pub(crate) dx: Vec<f64>,
    pub(crate) aux: Vec<f64>,
}

impl Recording {
    fn with_capacity(samples: usize, num_vars: usize, num_aux: usize) -> Self {
        Self {
            t: Vec::with_capacity(samples),
            x: Vec::with_capacity(samples * num_vars),
            dx: Vec::with_capacity(samples * num_vars),
            aux: Vec::with_capacity(samples * num_aux),
        }
    }
}

/// Samples a run over `span` records at stride `nout`, assuming steps of `dt`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn expected_samples(span: TimeSpan, dt: f64, nout: usize) -> usize {
    let steps = (span.duration() / dt).ceil() as usize;
    (steps / nout).saturating_add(1)
}

impl Slot {
    /// Creates a slot whose state starts at `x0`.
    pub(crate) fn new(
        x0: Vec<f64>,
        params: Vec<f64>,
        state: State,
        ws: Workspace,
        observer: ObserverState,
    ) -> Self {
        Self {
            x0,
            params,
            state,
            ws,
            observer,
            status: RowStatus::Pending,
        }
    }

    /// Loads a new initial state and parameters into the existing buffers and
    /// resets the run state. The observer is replaced when one is given and
    /// reset otherwise.
    pub(crate) fn reload(
        &mut self,
        x0: ArrayView1<'_, f64>,
        params: ArrayView1<'_, f64>,
        precision: Precision,
        dt: f64,
        noise: NoiseSource,
        observer: Option<ObserverState>,
    ) {
        for (dst, &src) in self.x0.iter_mut().zip(x0) {
            *dst = precision.round(src);
        }
        for (dst, &src) in self.params.iter_mut().zip(params) {
            *dst = precision.round(src);
        }

        self.state.t = 0.0;
        self.state.x.copy_from_slice(&self.x0);
        self.state.dx.fill(0.0);
        self.state.aux.fill(0.0);
        self.state.dt = dt;
        self.state.noise = noise;

        match observer {
            Some(observer) => self.observer = observer,
            None => self.observer.reset(),
        }
        self.status = RowStatus::Pending;
    }

    pub(crate) fn reseed(&mut self, noise: NoiseSource) {
        self.state.noise = noise;
    }

    /// Integrates from `x0`, discarding everything but the final state.
    pub(crate) fn transient<S: OdeSystem + ?Sized>(&mut self, run: &Run<'_, S>) -> RowStatus {
        self.restart(run);
        let result = run.integrator.integrate(
            run.system,
            &self.params,
            run.span,
            &mut self.state,
            &mut self.ws,
            (),
        );
        self.finish(result)
    }

    /// Integrates from `x0` through the observer and writes the features.
    pub(crate) fn features<S: OdeSystem + ?Sized>(
        &mut self,
        run: &Run<'_, S>,
        reset_observer: bool,
        out: &mut [f64],
    ) -> RowStatus {
        if reset_observer {
            self.observer.reset();
        }
        self.restart(run);

        let observer = &mut self.observer;
        let result = run.integrator.integrate(
            run.system,
            &self.params,
            run.span,
            &mut self.state,
            &mut self.ws,
            |event: &Event<'_>| -> Option<Action> {
                observer.consume(event);
                None
            },
        );
        let status = self.finish(result);

        if status.is_failed() {
            out.fill(f64::NAN);
        } else {
            self.observer.summarize(out);
            run.precision.round_slice(out);
        }
        status
    }

    /// Integrates from `x0`, recording the initial point and every `nout`-th
    /// accepted step, up to `max_store` samples.
    pub(crate) fn trajectory<S: OdeSystem + ?Sized>(
        &mut self,
        run: &Run<'_, S>,
        max_store: usize,
        nout: usize,
    ) -> (RowStatus, Recording) {
        self.restart(run);

        let samples = expected_samples(run.span, run.integrator.config().dt, nout).min(max_store);
        let mut recording = Recording::with_capacity(samples, self.x0.len(), self.state.aux.len());
        let rec = &mut recording;
        let result = run.integrator.integrate(
            run.system,
            &self.params,
            run.span,
            &mut self.state,
            &mut self.ws,
            |event: &Event<'_>| -> Option<Action> {
                if event.step % nout == 0 && rec.t.len() < max_store {
                    rec.t.push(event.t);
                    rec.x.extend_from_slice(event.x);
                    rec.dx.extend_from_slice(event.dx);
                    rec.aux.extend_from_slice(event.aux);
                }
                None
            },
        );

        (self.finish(result), recording)
    }

    /// Returns to `x0` with the configured initial step size, so every run
    /// over the same window takes the same steps.
    fn restart<S: ?Sized>(&mut self, run: &Run<'_, S>) {
        self.state.x.copy_from_slice(&self.x0);
        self.state.dt = run.integrator.config().dt;
    }

    fn finish(&mut self, result: Result<Solution, StepFailure>) -> RowStatus {
        self.status = match result {
            Ok(_) => RowStatus::Complete,
            Err(failure) => RowStatus::Failed(failure),
        };
        self.status
    }
}

#[cfg(test)]
mod tests {
    use cohort_core::ProblemDefinition;
    use cohort_observers::{ObserverConfig, ObserverKind};
    use cohort_solvers::{SolverConfig, Stepper};

    use super::*;

    fn decay(_t: f64, x: &[f64], p: &[f64], _w: &[f64], dx: &mut [f64], _aux: &mut [f64]) {
        dx[0] = -p[0] * x[0];
    }

    fn slot(problem: &ProblemDefinition, dt: f64) -> Slot {
        let observer = ObserverState::new(ObserverKind::Basic, &ObserverConfig::default(), problem);
        Slot::new(
            vec![1.0],
            vec![1.0],
            State::new(vec![1.0], 0, dt, NoiseSource::for_trajectory(0, 0)),
            Workspace::new(Stepper::Rk4, 1, 0, 0),
            observer,
        )
    }

    #[test]
    fn expected_samples_counts_the_initial_point() {
        let span = TimeSpan::new(0.0, 1.0).unwrap();
        assert_eq!(expected_samples(span, 0.25, 1), 5);
        assert_eq!(expected_samples(span, 0.25, 2), 3);
        assert_eq!(expected_samples(span, 0.3, 2), 3);
        assert_eq!(expected_samples(span, 1e-300, 1), usize::MAX);
    }

    #[test]
    fn recording_is_sized_up_front() {
        let problem = ProblemDefinition::new(["x"], ["k"], Vec::<String>::new(), 0).unwrap();
        let dt = 0.25;
        let run = Run {
            integrator: Integrator::new(
                Stepper::Rk4,
                SolverConfig::default().dt(dt),
                Precision::Double,
            ),
            system: &decay,
            span: TimeSpan::new(0.0, 1.0).unwrap(),
            precision: Precision::Double,
        };

        let mut slot = slot(&problem, dt);
        let (status, rec) = slot.trajectory(&run, 10, 2);
        assert_eq!(status, RowStatus::Complete);
        assert_eq!(rec.t, vec![0.0, 0.5, 1.0]);
        assert_eq!(rec.t.capacity(), 3);
        assert_eq!(rec.x.capacity(), 3);

        // The storage cap bounds the reservation.
        let (_, rec) = slot.trajectory(&run, 2, 1);
        assert_eq!(rec.t, vec![0.0, 0.25]);
        assert_eq!(rec.dx.capacity(), 2);
    }
}
