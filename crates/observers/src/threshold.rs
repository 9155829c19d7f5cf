use cohort_solvers::integrate::Event;

use crate::{FeatureObserver, ObserverConfig, events::EventRecord, tally::EventTally};

/// Position of the event variable relative to the two thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not yet below the re-arming threshold.
    Idle,

    /// Below the re-arming threshold; the next rise through the upper
    /// threshold is a crossing.
    Armed,

    /// Above the upper threshold since the last crossing; waiting to drop
    /// below the re-arming threshold.
    Tracking,
}

/// Detects upward crossings of `x_up_thresh` with hysteresis.
///
/// A crossing only counts after the event variable has dropped below
/// `x_down_thresh`, which suppresses chatter around the upper threshold. The
/// first crossing sets the reference time; each later crossing closes a
/// cycle whose interval is the time since the last accepted crossing and whose
/// amplitude is the peak of the feature variable over that cycle.
#[derive(Debug, Clone)]
pub struct ThresholdCrossing {
    config: ObserverConfig,
    phase: Phase,
    previous: Option<(f64, f64)>,
    reference: Option<f64>,
    peak: f64,
    tally: EventTally,
}

impl ThresholdCrossing {
    #[must_use]
    pub fn new(config: &ObserverConfig) -> Self {
        Self {
            config: *config,
            phase: Phase::Idle,
            previous: None,
            reference: None,
            peak: f64::NEG_INFINITY,
            tally: EventTally::new(config.max_event_count, config.feature_var),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Handles a crossing at time `t` with current feature value `feature`.
    fn crossing(&mut self, t: f64, feature: f64) {
        let Some(reference) = self.reference else {
            self.reference = Some(t);
            self.peak = feature;
            return;
        };

        let interval = t - reference;
        let amplitude = self.peak;
        if !self.config.accepts(interval, amplitude) {
            return;
        }

        self.tally.record(EventRecord {
            time: t,
            value: self.config.x_up_thresh,
            amplitude,
            interval,
        });
        self.reference = Some(t);
        self.peak = feature;
    }
}

impl FeatureObserver for ThresholdCrossing {
    fn consume(&mut self, event: &Event<'_>) {
        let feature = self.tally.sample(event);
        self.peak = self.peak.max(feature);

        let (t, x) = (event.t, event.x[self.config.event_var]);
        let (up, down) = (self.config.x_up_thresh, self.config.x_down_thresh);

        match self.phase {
            Phase::Idle if x < down => self.phase = Phase::Armed,
            Phase::Idle if x >= up => self.phase = Phase::Tracking,
            Phase::Idle => {}
            Phase::Armed if x >= up => {
                self.phase = Phase::Tracking;
                let crossed_at = match self.previous {
                    Some((t0, x0)) if x > x0 => t0 + (up - x0) / (x - x0) * (t - t0),
                    _ => t,
                };
                self.crossing(crossed_at, feature);
            }
            Phase::Armed => {}
            Phase::Tracking if x < down => self.phase = Phase::Armed,
            Phase::Tracking => {}
        }

        self.previous = Some((t, x));
    }

    fn summarize(&self, out: &mut [f64]) {
        self.tally.write(out);
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.previous = None;
        self.reference = None;
        self.peak = f64::NEG_INFINITY;
        self.tally.clear();
    }
}
