//! Anomaly tracker: windowed bootstrap followed by EWMA mean/variance
//! tracking and a k-sigma decision rule.
//!
//! The tracker starts in [`TrackerState::Bootstrapping`], collecting raw
//! samples into a fixed-capacity window. The instant the window is full, the
//! mean and mean squared deviation of that window seed the running estimates
//! and the tracker moves to [`TrackerState::SteadyState`] for good.
//!
//! Every subsequent sample updates the estimates with smoothing factor `α`:
//!
//! ```text
//! mean     = α * value + (1 - α) * mean
//! variance = α * (value - mean)^2 + (1 - α) * variance
//! anomaly  = |value - mean| > k * sqrt(variance)
//! ```
//!
//! Both the squared deviation and the decision use the mean *after* it has
//! absorbed the current sample. This is not the textbook EWMA variance of the
//! innovation sequence; detection characteristics depend on it, so it must
//! not be "corrected".

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::TrackerConfig;
use crate::error::{TrackerError, TrackerResult};
use crate::window::RingBuffer;

// ── State ───────────────────────────────────────────────────────────────

/// The two phases of a tracker. The transition is one-way.
#[derive(Clone, Debug)]
pub enum TrackerState {
    /// Collecting the first `window_size` samples. No verdicts possible.
    Bootstrapping { window: RingBuffer<f64> },
    /// Running estimates are live.
    SteadyState { mean: f64, variance: f64 },
}

impl TrackerState {
    fn bootstrapping(window_size: usize) -> Self {
        Self::Bootstrapping {
            window: RingBuffer::new(window_size),
        }
    }
}

// ── Verdict ─────────────────────────────────────────────────────────────

/// Annotated outcome of a single sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Verdict {
    /// The bootstrap window is still filling.
    Warmup {
        /// Samples in the bootstrap window, including this one.
        observed: usize,
        window_size: usize,
    },
    /// The sample was scored against the running estimates.
    Scored {
        value: f64,
        mean: f64,
        std_dev: f64,
        threshold: f64,
        /// `|value - mean|`.
        deviation: f64,
        is_anomaly: bool,
    },
}

impl Verdict {
    /// The boolean decision. Always `false` during warmup.
    pub fn is_anomaly(&self) -> bool {
        match self {
            Verdict::Warmup { .. } => false,
            Verdict::Scored { is_anomaly, .. } => *is_anomaly,
        }
    }

    fn score(value: f64, mean: f64, variance: f64, threshold_multiplier: f64) -> Self {
        let std_dev = variance.sqrt();
        let threshold = threshold_multiplier * std_dev;
        let deviation = (value - mean).abs();
        Verdict::Scored {
            value,
            mean,
            std_dev,
            threshold,
            deviation,
            is_anomaly: deviation > threshold,
        }
    }
}

// ── Tracker ─────────────────────────────────────────────────────────────

/// Streaming anomaly tracker for a single univariate sequence.
///
/// Constant memory and O(1) work per sample. Samples must be fed in arrival
/// order: the recurrence is order-dependent. The tracker has no interior
/// synchronization; share it across threads behind a `Mutex`.
#[derive(Clone, Debug)]
pub struct AnomalyTracker {
    config: TrackerConfig,
    state: TrackerState,
    samples_seen: u64,
    anomalies_flagged: u64,
}

impl AnomalyTracker {
    /// Create a tracker, rejecting an invalid configuration.
    pub fn new(config: TrackerConfig) -> TrackerResult<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Create a tracker from individual parameters.
    pub fn with_params(
        window_size: usize,
        smoothing_factor: f64,
        threshold_multiplier: f64,
    ) -> TrackerResult<Self> {
        Self::new(TrackerConfig::new(
            window_size,
            smoothing_factor,
            threshold_multiplier,
        ))
    }

    fn from_valid(config: TrackerConfig) -> Self {
        Self {
            state: TrackerState::bootstrapping(config.window_size),
            config,
            samples_seen: 0,
            anomalies_flagged: 0,
        }
    }

    /// Feed one sample and return whether it is anomalous.
    ///
    /// Returns `Ok(false)` for every sample before the bootstrap window is
    /// full. Non-finite samples are rejected without touching any state.
    pub fn update(&mut self, value: f64) -> TrackerResult<bool> {
        self.observe(value).map(|verdict| verdict.is_anomaly())
    }

    /// Feed one sample and return the annotated verdict.
    ///
    /// A finite sample whose effect on the estimates would overflow `f64` is
    /// refused with [`TrackerError::NumericOverflow`] and the estimates keep
    /// their previous values. At the bootstrap transition the sample stays in
    /// the window, so later samples slide the window until its statistics
    /// become representable.
    pub fn observe(&mut self, value: f64) -> TrackerResult<Verdict> {
        if !value.is_finite() {
            return Err(TrackerError::NonFiniteSample { value });
        }

        let alpha = self.config.smoothing_factor;
        let (mean, variance) = match &mut self.state {
            TrackerState::Bootstrapping { window } => {
                window.push(value);
                if !window.is_full() {
                    self.samples_seen += 1;
                    return Ok(Verdict::Warmup {
                        observed: window.len(),
                        window_size: self.config.window_size,
                    });
                }
                window.mean_and_variance()
            }
            TrackerState::SteadyState {
                mean: prev_mean,
                variance: prev_variance,
            } => {
                let mean = blend(alpha, value, *prev_mean);
                let deviation = value - mean;
                (mean, blend(alpha, deviation * deviation, *prev_variance))
            }
        };

        if !(mean.is_finite() && variance.is_finite()) {
            debug!(value, mean, variance, "sample rejected: estimates would overflow");
            return Err(TrackerError::NumericOverflow { value });
        }

        if self.is_bootstrapping() {
            debug!(
                window_size = self.config.window_size,
                mean, variance, "bootstrap window complete"
            );
        }
        self.state = TrackerState::SteadyState { mean, variance };
        self.samples_seen += 1;

        let verdict = Verdict::score(value, mean, variance, self.config.threshold_multiplier);
        if let Verdict::Scored {
            threshold,
            deviation,
            is_anomaly,
            ..
        } = verdict
        {
            if is_anomaly {
                self.anomalies_flagged += 1;
                debug!(value, mean, threshold, deviation, "anomaly detected");
            } else {
                trace!(value, mean, threshold, deviation, "sample within threshold");
            }
        }
        Ok(verdict)
    }

    /// The configuration this tracker was built with.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Current phase and estimates.
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Whether the bootstrap window is still filling.
    pub fn is_bootstrapping(&self) -> bool {
        matches!(self.state, TrackerState::Bootstrapping { .. })
    }

    /// Number of samples held in the bootstrap window (0 once seeded).
    pub fn bootstrap_len(&self) -> usize {
        match &self.state {
            TrackerState::Bootstrapping { window } => window.len(),
            TrackerState::SteadyState { .. } => 0,
        }
    }

    /// EWMA mean estimate, if seeded.
    pub fn mean(&self) -> Option<f64> {
        self.estimates().map(|(mean, _)| mean)
    }

    /// EWMA variance estimate, if seeded.
    pub fn variance(&self) -> Option<f64> {
        self.estimates().map(|(_, variance)| variance)
    }

    /// Square root of the variance estimate, if seeded.
    pub fn std_dev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    /// Current decision boundary `k * std_dev`, if seeded.
    pub fn threshold(&self) -> Option<f64> {
        self.std_dev()
            .map(|std_dev| self.config.threshold_multiplier * std_dev)
    }

    /// Samples that produced a verdict (rejected samples excluded).
    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    /// Samples that produced a positive verdict.
    pub fn anomalies_flagged(&self) -> u64 {
        self.anomalies_flagged
    }

    fn estimates(&self) -> Option<(f64, f64)> {
        match self.state {
            TrackerState::Bootstrapping { .. } => None,
            TrackerState::SteadyState { mean, variance } => Some((mean, variance)),
        }
    }
}

impl Default for AnomalyTracker {
    fn default() -> Self {
        Self::from_valid(TrackerConfig::default())
    }
}

/// One EWMA step.
#[inline]
fn blend(alpha: f64, observation: f64, previous: f64) -> f64 {
    alpha * observation + (1.0 - alpha) * previous
}
