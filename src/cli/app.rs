//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::plan;
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "plankit")]
#[command(author, version, about = "Inspect and restructure project plan snapshots")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Configuration file to use instead of the global one
    #[arg(long, global = true, env = "PLANKIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the task hierarchy
    Tree {
        /// Snapshot file (JSON or YAML)
        file: PathBuf,
    },

    /// Show entity counts
    Stats {
        /// Snapshot file (JSON or YAML)
        file: PathBuf,
    },

    /// Make task and resource IDs dense
    Renumber {
        /// Snapshot file (JSON or YAML)
        file: PathBuf,

        /// Number tasks in hierarchy (pre-order) instead of current ID order
        #[arg(long)]
        hierarchy: bool,

        /// Write the result here instead of back to FILE
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Renumber any kind whose unique IDs exceed the ceiling
    Validate {
        /// Snapshot file (JSON or YAML)
        file: PathBuf,

        /// Write the result here instead of back to FILE
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Remove a task, its subtree and its assignments
    RemoveTask {
        /// Snapshot file (JSON or YAML)
        file: PathBuf,

        /// Task ID
        id: u32,

        /// Write the result here instead of back to FILE
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Remove a resource and its assignments
    RemoveResource {
        /// Snapshot file (JSON or YAML)
        file: PathBuf,

        /// Resource ID
        id: u32,

        /// Write the result here instead of back to FILE
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show project start, finish and working duration
    Span {
        /// Snapshot file (JSON or YAML)
        file: PathBuf,

        /// Calendar to measure the duration on
        #[arg(long)]
        calendar: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "plankit=debug" } else { "plankit=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    debug!(source = ?config.source, "configuration loaded");

    let format = cli
        .format
        .unwrap_or_else(|| config.global.default_format.into());
    let output = Output::new(format);

    match cli.command {
        Commands::Tree { file } => plan::tree(&output, &config, &file)?,
        Commands::Stats { file } => plan::stats(&output, &config, &file)?,
        Commands::Renumber {
            file,
            hierarchy,
            output: target,
        } => plan::renumber(&output, &config, &file, hierarchy, target.as_deref())?,
        Commands::Validate {
            file,
            output: target,
        } => plan::validate(&output, &config, &file, target.as_deref())?,
        Commands::RemoveTask {
            file,
            id,
            output: target,
        } => plan::remove_task(&output, &config, &file, id, target.as_deref())?,
        Commands::RemoveResource {
            file,
            id,
            output: target,
        } => plan::remove_resource(&output, &config, &file, id, target.as_deref())?,
        Commands::Span { file, calendar } => {
            plan::span(&output, &config, &file, calendar.as_deref())?
        }
    }

    Ok(())
}
