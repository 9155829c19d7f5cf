use cohort_solvers::integrate::Event;

use crate::{
    events::{EventRecord, EventRing},
    stats::RunningStats,
};

/// Bookkeeping shared by the event-based observers.
///
/// Holds the event window plus running statistics of the feature variable,
/// and writes the common event feature layout.
#[derive(Debug, Clone)]
pub(crate) struct EventTally {
    ring: EventRing,
    feature_var: usize,
    feature: RunningStats,
    steps: usize,
}

impl EventTally {
    pub(crate) fn new(capacity: usize, feature_var: usize) -> Self {
        Self {
            ring: EventRing::with_capacity(capacity),
            feature_var,
            feature: RunningStats::new(),
            steps: 0,
        }
    }

    /// Updates the feature statistics and returns the feature variable value.
    pub(crate) fn sample(&mut self, event: &Event<'_>) -> f64 {
        let value = event.x[self.feature_var];
        self.feature.push(value);
        if event.step > 0 {
            self.steps += 1;
        }
        value
    }

    pub(crate) fn record(&mut self, record: EventRecord) {
        self.ring.push(record);
    }

    /// Writes the event features into `out`.
    pub(crate) fn write(&self, out: &mut [f64]) {
        self.write_with(out, None);
    }

    /// Writes the event features as if `pending` had been recorded.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn write_with(&self, out: &mut [f64], pending: Option<EventRecord>) {
        let window = || self.ring.iter_with(pending.as_ref());
        let intervals: RunningStats = window().map(|r| r.interval).collect();
        let amplitudes: RunningStats = window().map(|r| r.amplitude).collect();

        out[0] = (self.ring.total() + usize::from(pending.is_some())) as f64;
        out[1] = intervals.mean();
        out[2] = intervals.variance();
        out[3] = intervals.min();
        out[4] = intervals.max();
        out[5] = amplitudes.mean();
        out[6] = amplitudes.variance();
        out[7] = self.feature.max();
        out[8] = self.feature.min();
        out[9] = self.feature.mean();
        out[10] = self.steps as f64;
    }

    pub(crate) fn clear(&mut self) {
        self.ring.clear();
        self.feature = RunningStats::new();
        self.steps = 0;
    }
}
