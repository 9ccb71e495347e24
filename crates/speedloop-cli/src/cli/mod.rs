//! CLI for the speedloop URL speed tester.

mod commands;
mod interrupt;

use anyhow::Result;
use clap::{Parser, Subcommand};
use speedloop_core::config::DEFAULT_URLS_PATH;
use std::path::PathBuf;

use commands::{run_check, run_loop, run_measure};

/// Top-level CLI for speedloop.
#[derive(Debug, Parser)]
#[command(name = "speedloop")]
#[command(about = "speedloop: repeatedly download URLs and report throughput", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Measure every URL in the list, cycling until interrupted (Ctrl-C).
    Run {
        /// YAML file with a `urls` list.
        #[arg(long, default_value = DEFAULT_URLS_PATH, value_name = "PATH")]
        config: PathBuf,
        /// Go through the list once instead of repeating forever.
        #[arg(long)]
        once: bool,
    },

    /// Measure a single URL once.
    Measure {
        /// Direct HTTP/HTTPS URL to download.
        url: String,
    },

    /// Validate the URL list and print it.
    Check {
        /// YAML file with a `urls` list.
        #[arg(long, default_value = DEFAULT_URLS_PATH, value_name = "PATH")]
        config: PathBuf,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run { config, once } => run_loop(&config, once).await?,
            CliCommand::Measure { url } => run_measure(&url).await?,
            CliCommand::Check { config } => run_check(&config)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
