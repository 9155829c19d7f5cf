use cohort_solvers::integrate::Event;

use crate::{FeatureObserver, stats::RunningStats};

/// Extent and mean of one variable, without event logic.
#[derive(Debug, Clone)]
pub struct Basic {
    var: usize,
    last: f64,
    stats: RunningStats,
    steps: usize,
}

impl Basic {
    #[must_use]
    pub fn new(var: usize) -> Self {
        Self {
            var,
            last: f64::NAN,
            stats: RunningStats::new(),
            steps: 0,
        }
    }
}

impl FeatureObserver for Basic {
    fn consume(&mut self, event: &Event<'_>) {
        let value = event.x[self.var];
        self.last = value;
        self.stats.push(value);
        if event.step > 0 {
            self.steps += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn summarize(&self, out: &mut [f64]) {
        out[0] = self.last;
        out[1] = self.stats.max();
        out[2] = self.stats.min();
        out[3] = self.stats.mean();
        out[4] = self.steps as f64;
    }

    fn reset(&mut self) {
        *self = Self::new(self.var);
    }
}

/// Extent and mean of every variable.
#[derive(Debug, Clone)]
pub struct BasicAll {
    stats: Vec<RunningStats>,
    steps: usize,
}

impl BasicAll {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            stats: vec![RunningStats::new(); num_vars],
            steps: 0,
        }
    }
}

impl FeatureObserver for BasicAll {
    fn consume(&mut self, event: &Event<'_>) {
        for (stats, &value) in self.stats.iter_mut().zip(event.x) {
            stats.push(value);
        }
        if event.step > 0 {
            self.steps += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn summarize(&self, out: &mut [f64]) {
        for (chunk, stats) in out.chunks_exact_mut(3).zip(&self.stats) {
            chunk[0] = stats.max();
            chunk[1] = stats.min();
            chunk[2] = stats.mean();
        }
        out[3 * self.stats.len()] = self.steps as f64;
    }

    fn reset(&mut self) {
        self.stats.fill(RunningStats::new());
        self.steps = 0;
    }
}
