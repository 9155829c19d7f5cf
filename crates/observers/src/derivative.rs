use cohort_solvers::integrate::Event;

use crate::{FeatureObserver, ObserverConfig, events::EventRecord, tally::EventTally};

/// Direction of the feature variable, classified from its derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Unknown,
    Rising,
    Falling,
}

/// Detects local maxima of the feature variable from the sign of its derivative.
///
/// The variable is rising while `dx > max(dx_up_thresh, eps_dx)` and falling
/// while `dx < min(dx_down_thresh, -eps_dx)`; in between the direction is
/// unchanged. A switch from rising to falling marks a maximum at the highest
/// sample seen while rising (the switching sample included), and a switch
/// back marks a trough at the lowest sample seen while falling. The first
/// maximum is the reference; each later one is a candidate with amplitude
/// `peak - trough`.
#[derive(Debug, Clone)]
pub struct LocalMaxima {
    config: ObserverConfig,
    direction: Direction,
    extreme: (f64, f64),
    trough: Option<f64>,
    reference: Option<f64>,
    tally: EventTally,
}

impl LocalMaxima {
    #[must_use]
    pub fn new(config: &ObserverConfig) -> Self {
        Self {
            config: *config,
            direction: Direction::Unknown,
            extreme: (f64::NAN, f64::NAN),
            trough: None,
            reference: None,
            tally: EventTally::new(config.max_event_count, config.feature_var),
        }
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn classify(&self, dx: f64) -> Direction {
        let rising = self.config.dx_up_thresh.max(self.config.eps_dx);
        let falling = self.config.dx_down_thresh.min(-self.config.eps_dx);
        if dx > rising {
            Direction::Rising
        } else if dx < falling {
            Direction::Falling
        } else {
            self.direction
        }
    }

    fn maximum(&mut self, t: f64, peak: f64) {
        let Some(reference) = self.reference else {
            self.reference = Some(t);
            return;
        };

        let interval = t - reference;
        let amplitude = self.trough.map_or(0.0, |trough| peak - trough);
        if !self.config.accepts(interval, amplitude) {
            return;
        }

        self.tally.record(EventRecord {
            time: t,
            value: peak,
            amplitude,
            interval,
        });
        self.reference = Some(t);
    }
}

impl FeatureObserver for LocalMaxima {
    fn consume(&mut self, event: &Event<'_>) {
        let value = self.tally.sample(event);
        let t = event.t;
        let next = self.classify(event.dx[self.config.feature_var]);

        match (self.direction, next) {
            (Direction::Rising, Direction::Falling) => {
                let (peak_t, peak) = if value > self.extreme.1 {
                    (t, value)
                } else {
                    self.extreme
                };
                self.maximum(peak_t, peak);
                self.extreme = (t, value);
            }
            (Direction::Falling, Direction::Rising) => {
                self.trough = Some(self.extreme.1.min(value));
                self.extreme = (t, value);
            }
            (Direction::Unknown, _) => self.extreme = (t, value),
            (Direction::Rising, _) if value > self.extreme.1 => self.extreme = (t, value),
            (Direction::Falling, _) if value < self.extreme.1 => self.extreme = (t, value),
            _ => {}
        }

        self.direction = next;
    }

    fn summarize(&self, out: &mut [f64]) {
        self.tally.write(out);
    }

    fn reset(&mut self) {
        self.direction = Direction::Unknown;
        self.extreme = (f64::NAN, f64::NAN);
        self.trough = None;
        self.reference = None;
        self.tally.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use approx::assert_relative_eq;

    use super::*;

    fn feed(observer: &mut LocalMaxima, samples: &[(f64, f64, f64)]) {
        for (step, &(t, x, dx)) in samples.iter().enumerate() {
            let (x, dx) = ([x], [dx]);
            observer.consume(&Event {
                step,
                t,
                dt: 0.0,
                x: &x,
                dx: &dx,
                aux: &[],
            });
        }
    }

    fn summary(observer: &mut LocalMaxima) -> [f64; 11] {
        let mut out = [0.0; 11];
        observer.summarize(&mut out);
        out
    }

    #[test]
    fn sinusoid_maxima() {
        let config = ObserverConfig::default();
        let mut observer = LocalMaxima::new(&config);

        let samples: Vec<(f64, f64, f64)> = (0..=10_000)
            .map(|i| {
                let t = f64::from(i) * 1e-3;
                let w = TAU / 2.5;
                (t, 3.0 * (w * t).sin(), 3.0 * w * (w * t).cos())
            })
            .collect();
        feed(&mut observer, &samples);

        // Maxima near t = 0.625 + 2.5k for k = 0..3.
        let out = summary(&mut observer);
        assert_eq!(out[0], 3.0);
        assert_relative_eq!(out[1], 2.5, epsilon = 2e-3);
        assert_relative_eq!(out[5], 6.0, max_relative = 1e-5);
        assert_relative_eq!(out[3], out[4], epsilon = 2e-3);
    }

    #[test]
    fn dead_band_keeps_direction() {
        let config = ObserverConfig::default().dx_thresholds(0.5, -0.5);
        let mut observer = LocalMaxima::new(&config);

        feed(&mut observer, &[(0.0, 0.0, 1.0), (1.0, 1.0, 0.1), (2.0, 1.5, -0.1)]);
        assert_eq!(observer.direction(), Direction::Rising);

        feed(&mut observer, &[(3.0, 1.0, -1.0)]);
        assert_eq!(observer.direction(), Direction::Falling);
    }

    #[test]
    fn maximum_is_highest_rising_sample() {
        let config = ObserverConfig::default().rejection(0.0, 0.0);
        let mut observer = LocalMaxima::new(&config);

        // Reference maximum at t = 1, trough 0 at t = 3, maximum 5 at t = 5.
        feed(
            &mut observer,
            &[
                (0.0, 0.0, 1.0),
                (1.0, 2.0, 1.0),
                (2.0, 1.0, -1.0),
                (3.0, 0.0, -1.0),
                (4.0, 1.0, 1.0),
                (5.0, 5.0, 1.0),
                (6.0, 4.0, -1.0),
            ],
        );

        let out = summary(&mut observer);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[1], 4.0);
        assert_eq!(out[5], 5.0);
    }

    #[test]
    fn small_wiggles_are_rejected() {
        let config = ObserverConfig::default().rejection(2.0, 0.0);
        let mut observer = LocalMaxima::new(&config);

        feed(
            &mut observer,
            &[
                (0.0, 0.0, 1.0),
                (1.0, 3.0, -1.0),
                (2.0, 2.5, 1.0),
                (3.0, 3.0, -1.0),
                (4.0, 0.0, 1.0),
                (5.0, 3.0, -1.0),
            ],
        );

        // The wiggle at t = 3 has amplitude 0.5; the maximum at t = 5 is
        // measured from the reference at t = 1.
        let out = summary(&mut observer);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[1], 4.0);
        assert_eq!(out[5], 3.0);
    }
}
