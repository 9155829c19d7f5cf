/// Value reported for a statistic that lacks enough samples.
///
/// Means, minima, and maxima need one sample; variances need two.
pub const INSUFFICIENT_DATA: f64 = f64::NAN;

/// Streaming count, mean, variance, and range (Welford's algorithm).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Adds a sample.
    #[allow(clippy::cast_precision_loss)]
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            INSUFFICIENT_DATA
        } else {
            self.mean
        }
    }

    /// Sample variance (denominator `n - 1`).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            INSUFFICIENT_DATA
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        if self.count == 0 {
            INSUFFICIENT_DATA
        } else {
            self.min
        }
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        if self.count == 0 {
            INSUFFICIENT_DATA
        } else {
            self.max
        }
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        for value in iter {
            stats.push(value);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn empty_reports_insufficient_data() {
        let stats = RunningStats::new();
        assert_eq!(stats.count(), 0);
        assert!(stats.mean().is_nan());
        assert!(stats.variance().is_nan());
        assert!(stats.min().is_nan());
        assert!(stats.max().is_nan());
    }

    #[test]
    fn single_sample_has_no_variance() {
        let stats: RunningStats = [4.0].into_iter().collect();
        assert_eq!(stats.mean(), 4.0);
        assert_eq!(stats.min(), 4.0);
        assert_eq!(stats.max(), 4.0);
        assert!(stats.variance().is_nan());
    }

    #[test]
    fn matches_two_pass_formulas() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats: RunningStats = values.into_iter().collect();

        assert_relative_eq!(stats.mean(), 5.0);
        assert_relative_eq!(stats.variance(), 32.0 / 7.0);
        assert_eq!(stats.min(), 2.0);
        assert_eq!(stats.max(), 9.0);
    }
}
