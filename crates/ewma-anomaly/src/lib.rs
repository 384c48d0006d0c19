//! # ewma-anomaly
//!
//! Streaming anomaly detection for a single numeric sequence.
//!
//! The tracker runs in constant memory and constant time per sample, never
//! looks ahead, and adapts its notion of "normal" as the process drifts.
//!
//! ## Architecture
//!
//! ```text
//!   sample ──► AnomalyTracker::update / observe
//!                    │
//!                    ├── Bootstrapping { RingBuffer }  ← first window_size samples
//!                    │        │ window full: batch mean / mean squared deviation
//!                    │        ▼
//!                    └── SteadyState { mean, variance } ← EWMA recurrence
//!                                │
//!                                ▼
//!                  |value - mean| > k * sqrt(variance) ──► Verdict
//! ```
//!
//! ## Invariants
//!
//! - The bootstrap window never holds more than `window_size` samples.
//! - Mean and variance are seeded together and never un-seeded.
//! - The variance estimate stays non-negative for finite input.
//! - Non-finite samples are rejected and leave the tracker untouched.
//! - Seeded estimates are always finite. A sample that would push them out of
//!   `f64` range is rejected with [`TrackerError::NumericOverflow`].
//!
//! ## Quick Start
//!
//! ```rust
//! use ewma_anomaly::AnomalyTracker;
//!
//! let mut tracker = AnomalyTracker::with_params(5, 0.2, 2.0).unwrap();
//!
//! for _ in 0..9 {
//!     assert!(!tracker.update(10.0).unwrap());
//! }
//! assert!(tracker.update(1000.0).unwrap());
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod tracker;
pub mod window;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use config::{
    TrackerConfig, DEFAULT_SMOOTHING_FACTOR, DEFAULT_THRESHOLD_MULTIPLIER, DEFAULT_WINDOW_SIZE,
    MIN_WINDOW_SIZE,
};
pub use error::{TrackerError, TrackerResult};
pub use tracker::{AnomalyTracker, TrackerState, Verdict};
pub use window::{RingBuffer, RingBufferIter};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn integration_noisy_stream_with_spikes() {
        let mut tracker = AnomalyTracker::default();

        // Deterministic zig-zag around 100 with a spike every 97 samples.
        let mut flagged = Vec::new();
        for i in 0..1_000u32 {
            let jitter = if i % 2 == 0 { 0.5 } else { -0.5 };
            let value = if i > 30 && i % 97 == 0 {
                400.0
            } else {
                100.0 + jitter
            };
            if tracker.update(value).unwrap() {
                flagged.push(i);
            }
        }

        for i in (97..1_000).step_by(97) {
            assert!(flagged.contains(&i), "spike at {} not flagged", i);
        }
        assert_eq!(tracker.samples_seen(), 1_000);
        assert_eq!(tracker.anomalies_flagged() as usize, flagged.len());
    }

    #[test]
    fn integration_shared_behind_mutex() {
        let tracker = Arc::new(Mutex::new(
            AnomalyTracker::with_params(3, 0.5, 3.0).unwrap(),
        ));

        let handle = {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                for v in [1.0, 1.0, 1.0] {
                    tracker.lock().unwrap().update(v).unwrap();
                }
            })
        };
        handle.join().unwrap();

        let guard = tracker.lock().unwrap();
        assert!(!guard.is_bootstrapping());
        assert_eq!(guard.mean(), Some(1.0));
    }

    #[test]
    fn all_public_types_accessible() {
        let _config = TrackerConfig::default();
        let _error = TrackerError::NonFiniteSample { value: f64::NAN };
        let _rb: RingBuffer<f64> = RingBuffer::new(DEFAULT_WINDOW_SIZE);
        let tracker = AnomalyTracker::default();
        assert!(matches!(tracker.state(), TrackerState::Bootstrapping { .. }));
        let verdict = Verdict::Warmup {
            observed: 1,
            window_size: MIN_WINDOW_SIZE,
        };
        assert!(!verdict.is_anomaly());
        assert!(DEFAULT_SMOOTHING_FACTOR > 0.0 && DEFAULT_THRESHOLD_MULTIPLIER > 0.0);
    }
}
