//! Tracker configuration.
//!
//! All three parameters are fixed for the lifetime of a tracker. They are
//! checked once by [`TrackerConfig::validate`] and never clamped.

use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};

/// Default bootstrap window length.
pub const DEFAULT_WINDOW_SIZE: usize = 30;

/// Default EWMA smoothing factor (alpha).
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.2;

/// Default standard-deviation multiplier for the decision boundary.
pub const DEFAULT_THRESHOLD_MULTIPLIER: f64 = 2.0;

/// Smallest window that yields a meaningful bootstrap variance.
pub const MIN_WINDOW_SIZE: usize = 2;

/// Configuration for an [`AnomalyTracker`](crate::AnomalyTracker).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Number of samples collected before the estimates are seeded.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Weight of the newest sample in the EWMA recurrence, in `(0, 1]`.
    #[serde(default = "default_smoothing_factor")]
    pub smoothing_factor: f64,
    /// Multiplier applied to the estimated standard deviation.
    #[serde(default = "default_threshold_multiplier")]
    pub threshold_multiplier: f64,
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_smoothing_factor() -> f64 {
    DEFAULT_SMOOTHING_FACTOR
}

fn default_threshold_multiplier() -> f64 {
    DEFAULT_THRESHOLD_MULTIPLIER
}

impl TrackerConfig {
    /// Build a config from explicit parameters. Does not validate.
    pub fn new(window_size: usize, smoothing_factor: f64, threshold_multiplier: f64) -> Self {
        Self {
            window_size,
            smoothing_factor,
            threshold_multiplier,
        }
    }

    /// Check every parameter against its allowed range.
    ///
    /// NaN fails every comparison, so it is rejected for both real-valued
    /// parameters.
    pub fn validate(&self) -> TrackerResult<()> {
        if self.window_size < MIN_WINDOW_SIZE {
            return Err(TrackerError::InvalidWindowSize {
                window_size: self.window_size,
            });
        }
        if !(self.smoothing_factor > 0.0 && self.smoothing_factor <= 1.0) {
            return Err(TrackerError::InvalidSmoothingFactor {
                smoothing_factor: self.smoothing_factor,
            });
        }
        if !(self.threshold_multiplier > 0.0 && self.threshold_multiplier.is_finite()) {
            return Err(TrackerError::InvalidThresholdMultiplier {
                threshold_multiplier: self.threshold_multiplier,
            });
        }
        Ok(())
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            threshold_multiplier: DEFAULT_THRESHOLD_MULTIPLIER,
        }
    }
}
