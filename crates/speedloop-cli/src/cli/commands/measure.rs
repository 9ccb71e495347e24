//! `speedloop measure <url>` – one-off measurement of a single URL.

use anyhow::{Context, Result};
use speedloop_core::cancel::CancelToken;
use speedloop_core::config;
use speedloop_core::measure::Outcome;
use speedloop_core::runner;
use std::io;

use crate::cli::interrupt;

pub async fn run_measure(url: &str) -> Result<()> {
    let settings = config::load_or_init()?;
    let engine = settings.engine_options();
    let cancel = CancelToken::new();
    let interrupt_handle = interrupt::spawn_interrupt_handler(cancel.clone());

    let outcome = tokio::task::spawn_blocking({
        let url = url.to_string();
        move || {
            // Unlocked handle: each sample takes the lock briefly, so other output is never starved.
            let mut out = io::stdout();
            runner::run_one(&url, &engine, &cancel, &mut out)
        }
    })
    .await
    .context("measurement task join")?
    .context("write report")?;

    interrupt_handle.abort();
    match outcome {
        Outcome::Completed { bytes } => tracing::info!(url, bytes, "measurement completed"),
        Outcome::Failed(e) => tracing::info!(url, "measurement failed: {}", e),
        Outcome::Cancelled => tracing::info!(url, "measurement cancelled"),
    }
    Ok(())
}
