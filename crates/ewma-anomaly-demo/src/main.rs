#![deny(unsafe_code)]
//! Demo binary for the EWMA anomaly tracker.
//!
//! Feeds samples from a synthetic noisy stream (`simulate`) or from standard
//! input (`stdin`, one number per line) into a single tracker, logs every
//! detected anomaly, and prints a summary when the input ends.
//!
//! ```text
//! ewma-anomaly-demo simulate --samples 500 --seed 7
//! seq 1 100 | ewma-anomaly-demo --window-size 10 --json stdin
//! ```

mod report;
mod source;

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ewma_anomaly::{
    AnomalyTracker, TrackerConfig, DEFAULT_SMOOTHING_FACTOR, DEFAULT_THRESHOLD_MULTIPLIER,
    DEFAULT_WINDOW_SIZE,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use report::{Reporter, RunSummary};
use source::{parse_sample, SyntheticConfig, SyntheticStream};

/// Stream anomaly detection demo
#[derive(Parser, Debug)]
#[command(name = "ewma-anomaly-demo")]
#[command(about = "Flag anomalous samples in a numeric stream with an EWMA tracker", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    tracker: TrackerArgs,

    /// Emit one JSON verdict per sample on stdout
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct TrackerArgs {
    /// Samples collected before the estimates are seeded
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window_size: usize,

    /// EWMA weight of the newest sample, in (0, 1]
    #[arg(long, default_value_t = DEFAULT_SMOOTHING_FACTOR)]
    smoothing_factor: f64,

    /// Standard deviations from the mean that count as anomalous
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_MULTIPLIER)]
    threshold_multiplier: f64,
}

impl TrackerArgs {
    fn config(&self) -> TrackerConfig {
        TrackerConfig::new(
            self.window_size,
            self.smoothing_factor,
            self.threshold_multiplier,
        )
    }
}

/// Available sample sources
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a noisy stream with randomly injected spikes
    Simulate {
        /// Number of samples to generate
        #[arg(long, default_value_t = 1000)]
        samples: usize,

        /// Seed for a reproducible stream
        #[arg(long)]
        seed: Option<u64>,

        /// Level the stream fluctuates around
        #[arg(long, default_value_t = 100.0)]
        base: f64,

        /// Standard deviation of the normal fluctuation
        #[arg(long, default_value_t = 10.0)]
        noise: f64,

        /// Probability of a spike on any sample
        #[arg(long, default_value_t = 0.05)]
        anomaly_rate: f64,
    },

    /// Read one sample per line from standard input
    Stdin,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(io::stderr),
        )
        .init();

    let config = cli.tracker.config();
    let mut tracker = AnomalyTracker::new(config).context("invalid tracker configuration")?;
    debug!(?config, "tracker ready");

    let mut reporter = Reporter::new(io::stdout().lock(), cli.json);

    match cli.command {
        Commands::Simulate {
            samples,
            seed,
            base,
            noise,
            anomaly_rate,
        } => {
            let stream = SyntheticStream::new(SyntheticConfig {
                base,
                noise,
                anomaly_rate,
                seed,
                ..SyntheticConfig::default()
            })?;
            for value in stream.take(samples) {
                let verdict = tracker.observe(value)?;
                reporter.record(&verdict)?;
            }
        }
        Commands::Stdin => {
            for line in io::stdin().lock().lines() {
                let line = line.context("failed to read standard input")?;
                let value = match parse_sample(&line) {
                    None => continue,
                    Some(Ok(value)) => value,
                    Some(Err(e)) => {
                        reporter.reject(&e);
                        continue;
                    }
                };
                match tracker.observe(value) {
                    Ok(verdict) => reporter.record(&verdict)?,
                    Err(e) => reporter.reject(&e),
                }
            }
        }
    }

    let summary = reporter.finish(&tracker)?;
    log_summary(&summary);
    Ok(())
}

fn log_summary(summary: &RunSummary) {
    info!(
        samples = summary.samples,
        anomalies = summary.anomalies,
        rejected = summary.rejected,
        mean = ?summary.mean,
        std_dev = ?summary.std_dev,
        "run complete"
    );
}
