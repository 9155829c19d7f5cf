use std::{fmt, str::FromStr};

use thiserror::Error;

/// Storage precision of trajectory state.
///
/// Stepping arithmetic is always carried out in `f64`. With
/// [`Precision::Single`], state, time, and every recorded output are rounded
/// through `f32` after each accepted step, matching the behavior of
/// single-precision device buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(rename_all = "lowercase"))]
pub enum Precision {
    Single,
    #[default]
    Double,
}

/// Error returned when parsing an unknown precision name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown precision `{0}` (expected `single` or `double`)")]
pub struct ParsePrecisionError(pub String);

impl Precision {
    /// Rounds a value to this storage precision.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn round(self, value: f64) -> f64 {
        match self {
            Self::Single => f64::from(value as f32),
            Self::Double => value,
        }
    }

    /// Rounds every value in place.
    pub fn round_slice(self, values: &mut [f64]) {
        if self == Self::Single {
            for v in values {
                *v = self.round(*v);
            }
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Single => "single",
            Self::Double => "double",
        })
    }
}

impl FromStr for Precision {
    type Err = ParsePrecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "f32" => Ok(Self::Single),
            "double" | "f64" => Ok(Self::Double),
            _ => Err(ParsePrecisionError(s.to_owned())),
        }
    }
}
