//! Console reporting of verdicts and the end-of-run summary.

use std::io::Write;

use anyhow::Result;
use ewma_anomaly::{AnomalyTracker, Verdict};
use serde::Serialize;
use tracing::{info, warn};

/// One JSON line per scored sample.
#[derive(Serialize)]
struct VerdictLine<'a> {
    index: u64,
    #[serde(flatten)]
    verdict: &'a Verdict,
}

/// Totals for a finished run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub samples: u64,
    pub anomalies: u64,
    pub rejected: u64,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
}

/// Collects per-sample outcomes and writes them to `out`.
pub struct Reporter<W: Write> {
    out: W,
    json: bool,
    index: u64,
    rejected: u64,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            index: 0,
            rejected: 0,
        }
    }

    /// Record the verdict for the next sample.
    pub fn record(&mut self, verdict: &Verdict) -> Result<()> {
        let index = self.index;
        self.index += 1;

        if self.json {
            serde_json::to_writer(&mut self.out, &VerdictLine { index, verdict })?;
            writeln!(self.out)?;
        }
        if let Verdict::Scored {
            value,
            mean,
            threshold,
            ..
        } = verdict
        {
            if verdict.is_anomaly() {
                info!(index, value, mean, threshold, "anomaly detected");
            }
        }
        Ok(())
    }

    /// Note a sample that produced no verdict.
    pub fn reject(&mut self, reason: &dyn std::fmt::Display) {
        self.rejected += 1;
        warn!(%reason, "sample rejected");
    }

    /// Summarize the run from the tracker's final state.
    pub fn finish(mut self, tracker: &AnomalyTracker) -> Result<RunSummary> {
        self.out.flush()?;
        Ok(RunSummary {
            samples: tracker.samples_seen(),
            anomalies: tracker.anomalies_flagged(),
            rejected: self.rejected,
            mean: tracker.mean(),
            std_dev: tracker.std_dev(),
        })
    }
}
