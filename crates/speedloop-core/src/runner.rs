//! Reporting loop: measure each URL in turn, print every sample, optionally
//! repeat the whole list until cancelled.
//!
//! URLs are measured sequentially. Failures are reported and the loop moves
//! on; only output errors stop it.

use crate::cancel::CancelToken;
use crate::measure::{self, EngineOptions, Outcome};
use crate::report;
use std::io::{self, Write};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Cycle through the list until cancelled instead of a single pass.
    pub repeat: bool,
    pub engine: EngineOptions,
}

/// Totals for one `run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Passes started over the URL list.
    pub cycles: u64,
    pub completed: u64,
    pub failed: u64,
    /// True when the run stopped because of the cancel token.
    pub cancelled: bool,
}

impl RunSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Completed { .. } => self.completed += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::Cancelled => self.cancelled = true,
        }
    }
}

/// Measures one URL and writes every sample to `out`.
pub fn run_one<W: Write>(
    url: &str,
    engine: &EngineOptions,
    cancel: &CancelToken,
    out: &mut W,
) -> io::Result<Outcome> {
    let mut stream = measure::measure(url, engine, cancel);
    for sample in stream.by_ref() {
        report::write_sample(out, &sample)?;
    }
    Ok(stream.finish())
}

/// Runs the measurement loop over `urls`. An empty list returns immediately,
/// also in repeat mode.
pub fn run<W: Write>(
    urls: &[String],
    opts: &RunOptions,
    cancel: &CancelToken,
    out: &mut W,
) -> io::Result<RunSummary> {
    let mut summary = RunSummary::default();
    if urls.is_empty() {
        tracing::warn!("URL list is empty; nothing to measure");
        return Ok(summary);
    }

    'cycles: loop {
        summary.cycles += 1;
        tracing::debug!(cycle = summary.cycles, "starting pass over {} URL(s)", urls.len());
        for url in urls {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break 'cycles;
            }
            let outcome = run_one(url, &opts.engine, cancel, out)?;
            summary.record(&outcome);
        }
        if !opts.repeat || cancel.is_cancelled() {
            summary.cancelled |= cancel.is_cancelled();
            break;
        }
    }

    tracing::info!(
        cycles = summary.cycles,
        completed = summary.completed,
        failed = summary.failed,
        cancelled = summary.cancelled,
        "measurement loop finished"
    );
    Ok(summary)
}
