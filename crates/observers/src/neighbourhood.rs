use cohort_solvers::integrate::Event;

use crate::{FeatureObserver, ObserverConfig, events::EventRecord, tally::EventTally};

/// Position of the trajectory relative to the anchor ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recurrence {
    /// Within `2 * radius` of the anchor since the last recurrence.
    Near,

    /// Left the `2 * radius` ball; a return below `radius` is a recurrence.
    Away,

    /// Inside the `radius` ball, tracking the closest approach so far.
    Returning { distance: f64, t: f64 },
}

/// Detects recurrences of the full state to the first observed state.
///
/// The first consumed sample becomes the anchor. The trajectory leaves when
/// its Euclidean distance to the anchor exceeds `2 * radius`, and returns when
/// the distance drops below `radius`. A return is resolved at the closest
/// approach inside the ball once the trajectory moves away again; a summary
/// taken while inside counts the closest approach so far. The interval is the
/// time since the previous recurrence (or the anchor), and the amplitude is
/// the range of the feature variable over the cycle.
#[derive(Debug, Clone)]
pub struct Neighbourhood {
    config: ObserverConfig,
    anchor: Vec<f64>,
    anchored: bool,
    phase: Recurrence,
    last: f64,
    latest: f64,
    range: (f64, f64),
    tally: EventTally,
}

impl Neighbourhood {
    #[must_use]
    pub fn new(config: &ObserverConfig, num_vars: usize) -> Self {
        Self {
            config: *config,
            anchor: vec![0.0; num_vars],
            anchored: false,
            phase: Recurrence::Near,
            last: 0.0,
            latest: f64::NAN,
            range: (f64::INFINITY, f64::NEG_INFINITY),
            tally: EventTally::new(config.max_event_count, config.feature_var),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Recurrence {
        self.phase
    }

    fn distance(&self, x: &[f64]) -> f64 {
        self.anchor
            .iter()
            .zip(x)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// The event a recurrence at `t` would record, if it passes rejection.
    fn candidate(&self, t: f64, distance: f64) -> Option<EventRecord> {
        let interval = t - self.last;
        let amplitude = self.range.1 - self.range.0;
        self.config
            .accepts(interval, amplitude)
            .then_some(EventRecord {
                time: t,
                value: distance,
                amplitude,
                interval,
            })
    }

    fn recur(&mut self, t: f64, distance: f64) {
        if let Some(record) = self.candidate(t, distance) {
            self.tally.record(record);
            self.last = t;
            self.range = (self.latest, self.latest);
        }
    }
}

impl FeatureObserver for Neighbourhood {
    fn consume(&mut self, event: &Event<'_>) {
        let value = self.tally.sample(event);
        self.latest = value;
        self.range = (self.range.0.min(value), self.range.1.max(value));

        if !self.anchored {
            self.anchor.copy_from_slice(event.x);
            self.anchored = true;
            self.last = event.t;
            return;
        }

        let radius = self.config.neighbourhood_radius;
        let d = self.distance(event.x);

        match self.phase {
            Recurrence::Near if d > 2.0 * radius => self.phase = Recurrence::Away,
            Recurrence::Away if d < radius => {
                self.phase = Recurrence::Returning {
                    distance: d,
                    t: event.t,
                };
            }
            Recurrence::Returning { distance, .. } if d < distance => {
                self.phase = Recurrence::Returning {
                    distance: d,
                    t: event.t,
                };
            }
            Recurrence::Returning { distance, t } if d > radius => {
                self.recur(t, distance);
                self.phase = if d > 2.0 * radius {
                    Recurrence::Away
                } else {
                    Recurrence::Near
                };
            }
            _ => {}
        }
    }

    /// Writes the event features, counting a return still in progress at its
    /// closest approach so far. The return stays open, so a later run can
    /// still move it to a closer sample.
    fn summarize(&self, out: &mut [f64]) {
        let pending = match self.phase {
            Recurrence::Returning { distance, t } => self.candidate(t, distance),
            Recurrence::Near | Recurrence::Away => None,
        };
        self.tally.write_with(out, pending);
    }

    fn reset(&mut self) {
        self.anchored = false;
        self.phase = Recurrence::Near;
        self.last = 0.0;
        self.latest = f64::NAN;
        self.range = (f64::INFINITY, f64::NEG_INFINITY);
        self.tally.clear();
    }
}
