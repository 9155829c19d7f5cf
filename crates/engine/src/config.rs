use cohort_core::Precision;
use cohort_observers::ObserverKind;
use cohort_solvers::Stepper;

/// Choices fixed for the lifetime of an [`Engine`](crate::Engine).
///
/// # Example
///
/// ```
/// use cohort_engine::EngineConfig;
///
/// let config = EngineConfig {
///     stepper: "dopri5".parse().unwrap(),
///     observer: "neighbourhood".parse().unwrap(),
///     precision: "single".parse().unwrap(),
///     seed: 7,
/// };
/// assert_eq!(config.stepper.to_string(), "dopri5");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(default))]
pub struct EngineConfig {
    pub stepper: Stepper,
    pub observer: ObserverKind,
    pub precision: Precision,

    /// Base seed of the per-trajectory noise streams.
    pub seed: u64,
}
