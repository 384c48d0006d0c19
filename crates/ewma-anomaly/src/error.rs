use thiserror::Error;

/// Errors from the anomaly tracker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    #[error("window size out of range: {window_size} (must be >= 2)")]
    InvalidWindowSize { window_size: usize },

    #[error("smoothing factor out of range: {smoothing_factor} (must be in (0, 1])")]
    InvalidSmoothingFactor { smoothing_factor: f64 },

    #[error("threshold multiplier out of range: {threshold_multiplier} (must be finite and > 0)")]
    InvalidThresholdMultiplier { threshold_multiplier: f64 },

    #[error("non-finite sample rejected: {value}")]
    NonFiniteSample { value: f64 },

    #[error("sample {value} drives the running estimates out of f64 range")]
    NumericOverflow { value: f64 },
}

impl TrackerError {
    /// Whether this error came from construction-time configuration rather
    /// than from a sample.
    pub fn is_config_error(&self) -> bool {
        !matches!(
            self,
            TrackerError::NonFiniteSample { .. } | TrackerError::NumericOverflow { .. }
        )
    }
}

/// Convenience type alias for tracker results.
pub type TrackerResult<T> = Result<T, TrackerError>;
