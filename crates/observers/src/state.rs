use cohort_core::ProblemDefinition;
use cohort_solvers::integrate::Event;

use crate::{
    Basic, BasicAll, FeatureObserver, LocalMaxima, Neighbourhood, ObserverConfig, ObserverKind,
    ThresholdCrossing,
};

/// Observer state of one trajectory, for any [`ObserverKind`].
///
/// All buffers are allocated by [`ObserverState::new`]; consuming events never
/// allocates.
#[derive(Debug, Clone)]
pub enum ObserverState {
    Basic(Basic),
    BasicAll(BasicAll),
    ThresholdCrossing(ThresholdCrossing),
    Derivative(LocalMaxima),
    Neighbourhood(Neighbourhood),
}

impl ObserverState {
    /// Creates a fresh observer of the given kind.
    ///
    /// The config is expected to have passed [`ObserverConfig::validate`] for
    /// this problem.
    #[must_use]
    pub fn new(kind: ObserverKind, config: &ObserverConfig, problem: &ProblemDefinition) -> Self {
        match kind {
            ObserverKind::Basic => Self::Basic(Basic::new(config.feature_var)),
            ObserverKind::BasicAll => Self::BasicAll(BasicAll::new(problem.num_vars())),
            ObserverKind::ThresholdCrossing => {
                Self::ThresholdCrossing(ThresholdCrossing::new(config))
            }
            ObserverKind::Derivative => Self::Derivative(LocalMaxima::new(config)),
            ObserverKind::Neighbourhood => {
                Self::Neighbourhood(Neighbourhood::new(config, problem.num_vars()))
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> ObserverKind {
        match self {
            Self::Basic(_) => ObserverKind::Basic,
            Self::BasicAll(_) => ObserverKind::BasicAll,
            Self::ThresholdCrossing(_) => ObserverKind::ThresholdCrossing,
            Self::Derivative(_) => ObserverKind::Derivative,
            Self::Neighbourhood(_) => ObserverKind::Neighbourhood,
        }
    }

    fn inner(&self) -> &dyn FeatureObserver {
        match self {
            Self::Basic(o) => o,
            Self::BasicAll(o) => o,
            Self::ThresholdCrossing(o) => o,
            Self::Derivative(o) => o,
            Self::Neighbourhood(o) => o,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn FeatureObserver {
        match self {
            Self::Basic(o) => o,
            Self::BasicAll(o) => o,
            Self::ThresholdCrossing(o) => o,
            Self::Derivative(o) => o,
            Self::Neighbourhood(o) => o,
        }
    }
}

impl FeatureObserver for ObserverState {
    fn consume(&mut self, event: &Event<'_>) {
        self.inner_mut().consume(event);
    }

    fn summarize(&self, out: &mut [f64]) {
        self.inner().summarize(out);
    }

    fn reset(&mut self) {
        self.inner_mut().reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_every_kind() {
        let problem =
            ProblemDefinition::new(["x", "y"], Vec::<String>::new(), Vec::<String>::new(), 0)
                .unwrap();
        let config = ObserverConfig::default().feature_var(1);
        let x = [0.5, -0.5];

        for kind in ObserverKind::ALL {
            let mut state = ObserverState::new(kind, &config, &problem);
            assert_eq!(state.kind(), kind);

            state.consume(&Event {
                step: 0,
                t: 0.0,
                dt: 0.0,
                x: &x,
                dx: &x,
                aux: &[],
            });

            let mut out = vec![0.0; kind.num_features(&problem)];
            state.summarize(&mut out);
            assert_eq!(out[out.len() - 1], 0.0, "{kind} step count");
        }
    }
}
