//! `speedloop run` – the measurement loop over the configured URL list.

use anyhow::{Context, Result};
use speedloop_core::cancel::CancelToken;
use speedloop_core::config;
use speedloop_core::runner::{self, RunOptions};
use std::io;
use std::path::Path;

use crate::cli::interrupt;

pub async fn run_loop(config_path: &Path, once: bool) -> Result<()> {
    let list = config::load_urls(config_path)?;
    for url in list.suspicious() {
        tracing::warn!(url, "entry is not an http(s) URL; it will likely fail");
    }
    let settings = config::load_or_init()?;
    tracing::debug!("loaded settings: {:?}", settings);

    if list.is_empty() {
        println!("No URLs configured in {}.", config_path.display());
        return Ok(());
    }

    let cancel = CancelToken::new();
    let interrupt_handle = interrupt::spawn_interrupt_handler(cancel.clone());

    let opts = RunOptions {
        repeat: !once,
        engine: settings.engine_options(),
    };
    let summary = tokio::task::spawn_blocking(move || {
        // Unlocked handle: each sample takes the lock briefly, so other output is never starved.
        let mut out = io::stdout();
        runner::run(&list.urls, &opts, &cancel, &mut out)
    })
    .await
    .context("measurement task join")?
    .context("write report")?;

    interrupt_handle.abort();
    tracing::info!(
        "run finished: {} pass(es), {} completed, {} failed",
        summary.cycles,
        summary.completed,
        summary.failed
    );
    Ok(())
}
