//! Sampling configuration.

use std::fmt;
use std::time::Duration;

/// Default sampling interval in seconds.
pub const DEFAULT_INTERVAL_SECS: f64 = 2.0;

/// Error type for invalid configuration values.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Interval is zero, negative, or not a finite number.
    InvalidInterval(f64),
    /// Interval is positive but rounds to zero or overflows a `Duration`.
    IntervalOutOfRange(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidInterval(secs) => {
                write!(f, "invalid interval {}s: must be a positive number", secs)
            }
            ConfigError::IntervalOutOfRange(secs) => write!(
                f,
                "invalid interval {}s: must be between 1ns and {}s",
                secs,
                Duration::MAX.as_secs()
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validates an interval in seconds and converts it to a `Duration`.
///
/// The result is never zero: values below one nanosecond are rejected, as
/// are values too large for a `Duration`.
pub fn interval_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::InvalidInterval(secs));
    }
    match Duration::try_from_secs_f64(secs) {
        Ok(interval) if !interval.is_zero() => Ok(interval),
        _ => Err(ConfigError::IntervalOutOfRange(secs)),
    }
}

/// Sampling configuration supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleConfig {
    /// Time between two ticks.
    pub interval: Duration,
    /// Whether the host wants the engine to run at all.
    pub enabled: bool,
}

impl SampleConfig {
    /// Builds an enabled configuration from an interval in seconds.
    ///
    /// Accepts any interval from one nanosecond up to `Duration::MAX`.
    pub fn from_secs(secs: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            interval: interval_from_secs(secs)?,
            enabled: true,
        })
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs_f64(DEFAULT_INTERVAL_SECS),
            enabled: true,
        }
    }
}
