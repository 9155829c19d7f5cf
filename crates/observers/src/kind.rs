use std::{fmt, str::FromStr};

use cohort_core::ProblemDefinition;
use thiserror::Error;

/// Feature extraction strategy applied to every trajectory of an ensemble.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(try_from = "String", into = "String"))]
pub enum ObserverKind {
    /// Extent and mean of the feature variable.
    Basic,

    /// Extent and mean of every variable.
    BasicAll,

    /// Events at upward crossings of the rising threshold, with hysteresis.
    #[default]
    ThresholdCrossing,

    /// Events at local maxima of the feature variable.
    Derivative,

    /// Events at recurrences to the initial state.
    Neighbourhood,
}

/// Error returned when parsing an unknown observer name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown observer `{0}`")]
pub struct ParseObserverError(pub String);

/// Names of the event-based features, in output order.
const EVENT_FEATURES: [&str; 11] = [
    "event count",
    "period mean",
    "period variance",
    "period min",
    "period max",
    "amplitude mean",
    "amplitude variance",
    "max x",
    "min x",
    "mean x",
    "step count",
];

const BASIC_FEATURES: [&str; 5] = ["final x", "max x", "min x", "mean x", "step count"];

impl ObserverKind {
    pub const ALL: [Self; 5] = [
        Self::Basic,
        Self::BasicAll,
        Self::ThresholdCrossing,
        Self::Derivative,
        Self::Neighbourhood,
    ];

    /// Short configuration name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::BasicAll => "basic-all",
            Self::ThresholdCrossing => "threshold-crossing",
            Self::Derivative => "derivative",
            Self::Neighbourhood => "neighbourhood",
        }
    }

    /// Whether this kind detects events.
    #[must_use]
    pub fn is_event_based(self) -> bool {
        !matches!(self, Self::Basic | Self::BasicAll)
    }

    /// Ordered feature names for a problem.
    ///
    /// The names depend only on the kind and the problem's variable names.
    #[must_use]
    pub fn feature_names(self, problem: &ProblemDefinition) -> Vec<String> {
        match self {
            Self::Basic => BASIC_FEATURES.iter().map(|&s| s.to_owned()).collect(),
            Self::BasicAll => {
                let mut names = Vec::with_capacity(3 * problem.num_vars() + 1);
                for var in problem.variables() {
                    names.push(format!("max {var}"));
                    names.push(format!("min {var}"));
                    names.push(format!("mean {var}"));
                }
                names.push("step count".to_owned());
                names
            }
            Self::ThresholdCrossing | Self::Derivative | Self::Neighbourhood => {
                EVENT_FEATURES.iter().map(|&s| s.to_owned()).collect()
            }
        }
    }

    /// Length of the feature vector for a problem.
    #[must_use]
    pub fn num_features(self, problem: &ProblemDefinition) -> usize {
        match self {
            Self::Basic => BASIC_FEATURES.len(),
            Self::BasicAll => 3 * problem.num_vars() + 1,
            Self::ThresholdCrossing | Self::Derivative | Self::Neighbourhood => {
                EVENT_FEATURES.len()
            }
        }
    }
}

impl fmt::Display for ObserverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ObserverKind {
    type Err = ParseObserverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        match key.as_str() {
            "basic" => Ok(Self::Basic),
            "basicall" => Ok(Self::BasicAll),
            "thresholdcrossing" | "threshold" | "thresh2" => Ok(Self::ThresholdCrossing),
            "derivative" | "localmax" => Ok(Self::Derivative),
            "neighbourhood" | "neighborhood" | "nhood" => Ok(Self::Neighbourhood),
            _ => Err(ParseObserverError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for ObserverKind {
    type Error = ParseObserverError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObserverKind> for String {
    fn from(kind: ObserverKind) -> Self {
        kind.name().to_owned()
    }
}
