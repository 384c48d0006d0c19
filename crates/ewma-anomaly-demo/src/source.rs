//! Sample sources for the demo: a synthetic noisy stream with injected
//! spikes, and a line-oriented text reader.

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

/// Parameters of the synthetic stream.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Level the stream fluctuates around.
    pub base: f64,
    /// Standard deviation of the Gaussian fluctuation.
    pub noise: f64,
    /// Per-sample probability of adding a spike.
    pub anomaly_rate: f64,
    /// Spike magnitudes are drawn uniformly from `[min, max)`.
    pub spike_min: f64,
    pub spike_max: f64,
    /// Fixed seed for reproducible runs; entropy-seeded when `None`.
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            base: 100.0,
            noise: 10.0,
            anomaly_rate: 0.05,
            spike_min: 50.0,
            spike_max: 100.0,
            seed: None,
        }
    }
}

/// Endless stream of `base + N(0, noise)` samples, occasionally offset by a
/// spike of random sign.
#[derive(Debug)]
pub struct SyntheticStream {
    rng: StdRng,
    normal: Normal<f64>,
    config: SyntheticConfig,
}

impl SyntheticStream {
    pub fn new(config: SyntheticConfig) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.anomaly_rate) {
            bail!("anomaly rate {} must be within [0, 1]", config.anomaly_rate);
        }
        if !(config.noise >= 0.0 && config.noise.is_finite()) {
            bail!("noise level {} must be finite and non-negative", config.noise);
        }
        if !(config.spike_min < config.spike_max) {
            bail!(
                "spike range [{}, {}) is empty",
                config.spike_min,
                config.spike_max
            );
        }
        let normal = Normal::new(0.0, config.noise)
            .with_context(|| format!("invalid noise level {}", config.noise))?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            rng,
            normal,
            config,
        })
    }
}

impl Iterator for SyntheticStream {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let mut value = self.config.base + self.rng.sample(self.normal);
        if self.rng.gen::<f64>() < self.config.anomaly_rate {
            let sign = if self.rng.gen::<bool>() { 1.0 } else { -1.0 };
            value += sign * self.rng.gen_range(self.config.spike_min..self.config.spike_max);
        }
        Some(value)
    }
}

/// Parse one line of text input. Blank lines yield `None`.
pub fn parse_sample(line: &str) -> Option<Result<f64>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        trimmed
            .parse::<f64>()
            .with_context(|| format!("not a number: {:?}", trimmed)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> SyntheticConfig {
        SyntheticConfig {
            seed: Some(seed),
            ..SyntheticConfig::default()
        }
    }

    #[test]
    fn seeded_streams_are_reproducible() {
        let a: Vec<f64> = SyntheticStream::new(seeded(42)).unwrap().take(100).collect();
        let b: Vec<f64> = SyntheticStream::new(seeded(42)).unwrap().take(100).collect();
        assert_eq!(a, b);

        let c: Vec<f64> = SyntheticStream::new(seeded(43)).unwrap().take(100).collect();
        assert_ne!(a, c);
    }

    #[test]
    fn no_spikes_stays_near_base() {
        let config = SyntheticConfig {
            noise: 1.0,
            anomaly_rate: 0.0,
            ..seeded(1)
        };
        let samples: Vec<f64> = SyntheticStream::new(config).unwrap().take(1_000).collect();
        assert!(samples.iter().all(|v| (v - 100.0).abs() < 10.0));
    }

    #[test]
    fn every_sample_spiked_at_full_rate() {
        let config = SyntheticConfig {
            noise: 1.0,
            anomaly_rate: 1.0,
            ..seeded(2)
        };
        let samples: Vec<f64> = SyntheticStream::new(config).unwrap().take(500).collect();
        assert!(samples.iter().all(|v| (v - 100.0).abs() > 40.0));
    }

    #[test]
    fn rejects_bad_parameters() {
        let bad_rate = SyntheticConfig {
            anomaly_rate: 1.5,
            ..SyntheticConfig::default()
        };
        assert!(SyntheticStream::new(bad_rate).is_err());

        let bad_noise = SyntheticConfig {
            noise: -1.0,
            ..SyntheticConfig::default()
        };
        let err = SyntheticStream::new(bad_noise).unwrap_err();
        assert!(err.to_string().contains("non-negative"));

        for noise in [f64::NAN, f64::INFINITY] {
            let config = SyntheticConfig {
                noise,
                ..SyntheticConfig::default()
            };
            assert!(SyntheticStream::new(config).is_err());
        }

        let silent = SyntheticConfig {
            noise: 0.0,
            anomaly_rate: 0.0,
            seed: Some(3),
            ..SyntheticConfig::default()
        };
        let samples: Vec<f64> = SyntheticStream::new(silent).unwrap().take(5).collect();
        assert_eq!(samples, vec![100.0; 5]);

        let bad_range = SyntheticConfig {
            spike_min: 10.0,
            spike_max: 10.0,
            ..SyntheticConfig::default()
        };
        assert!(SyntheticStream::new(bad_range).is_err());
    }

    #[test]
    fn parse_sample_lines() {
        assert!(parse_sample("").is_none());
        assert!(parse_sample("   \t").is_none());
        assert_eq!(parse_sample(" 12.5 \n").unwrap().unwrap(), 12.5);
        assert_eq!(parse_sample("-3e2").unwrap().unwrap(), -300.0);
        assert!(parse_sample("abc").unwrap().is_err());
        assert!(parse_sample("NaN").unwrap().unwrap().is_nan());
    }
}
