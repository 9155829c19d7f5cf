use thiserror::Error;

/// The integration window `[start, end]` of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSpan {
    start: f64,
    end: f64,
}

/// Errors that can occur when constructing a [`TimeSpan`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum TimeSpanError {
    #[error("time span bounds must be finite")]
    NotFinite,

    #[error("time span end ({end}) precedes start ({start})")]
    Reversed { start: f64, end: f64 },
}

impl TimeSpan {
    /// Creates a time span.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound is not finite or `end < start`.
    pub fn new(start: f64, end: f64) -> Result<Self, TimeSpanError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(TimeSpanError::NotFinite);
        }
        if end < start {
            return Err(TimeSpanError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Length of the window.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Returns the next window of equal length, starting where this one ends.
    #[must_use]
    pub fn shifted(&self) -> Self {
        Self {
            start: self.end,
            end: self.end + self.duration(),
        }
    }
}
