use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::tableau::{self, Tableau};

/// Integration algorithm used for every trajectory of an ensemble.
///
/// Fixed-step variants advance by [`SolverConfig::dt`]; adaptive variants use
/// their embedded error estimate to pick the step size.
///
/// [`SolverConfig::dt`]: crate::SolverConfig::dt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(try_from = "String", into = "String"))]
pub enum Stepper {
    /// Forward Euler, order 1.
    Euler,

    /// Heun's method (explicit trapezoid), order 2.
    Heun,

    /// Classic fourth-order Runge-Kutta.
    #[default]
    Rk4,

    /// Adaptive Heun–Euler 2(1).
    HeunEuler,

    /// Adaptive Bogacki–Shampine 3(2).
    BogackiShampine23,

    /// Adaptive Dormand–Prince 5(4).
    DormandPrince5,
}

/// Error returned when parsing an unknown stepper name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown stepper `{0}`")]
pub struct ParseStepperError(pub String);

impl Stepper {
    /// All variants, in order of increasing cost.
    pub const ALL: [Self; 6] = [
        Self::Euler,
        Self::Heun,
        Self::Rk4,
        Self::HeunEuler,
        Self::BogackiShampine23,
        Self::DormandPrince5,
    ];

    /// The Butcher tableau implementing this stepper.
    #[must_use]
    pub fn tableau(self) -> &'static Tableau {
        match self {
            Self::Euler => &tableau::EULER,
            Self::Heun => &tableau::HEUN,
            Self::Rk4 => &tableau::RK4,
            Self::HeunEuler => &tableau::HEUN_EULER,
            Self::BogackiShampine23 => &tableau::BOGACKI_SHAMPINE_23,
            Self::DormandPrince5 => &tableau::DORMAND_PRINCE_5,
        }
    }

    /// Whether step size is chosen from an error estimate.
    #[must_use]
    pub fn is_adaptive(self) -> bool {
        self.tableau().is_adaptive()
    }

    /// Short configuration name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Euler => "euler",
            Self::Heun => "heun",
            Self::Rk4 => "rk4",
            Self::HeunEuler => "heuneuler",
            Self::BogackiShampine23 => "bs23",
            Self::DormandPrince5 => "dopri5",
        }
    }
}

impl fmt::Display for Stepper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stepper {
    type Err = ParseStepperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        match key.as_str() {
            "euler" => Ok(Self::Euler),
            "heun" => Ok(Self::Heun),
            "rk4" | "rungekutta4" => Ok(Self::Rk4),
            "heuneuler" => Ok(Self::HeunEuler),
            "bs23" | "bogackishampine23" => Ok(Self::BogackiShampine23),
            "dopri5" | "dormandprince" | "dormandprince5" => Ok(Self::DormandPrince5),
            _ => Err(ParseStepperError(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Stepper {
    type Error = ParseStepperError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Stepper> for String {
    fn from(stepper: Stepper) -> Self {
        stepper.name().to_owned()
    }
}
