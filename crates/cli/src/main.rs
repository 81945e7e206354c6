//! TKGI Application Tracker CLI
//!
//! A command-line tool for aggregating namespace inventory into application
//! reports and consolidating those reports across foundations.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::RunArgs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracker_lib::{StructuredLogger, TrackerMetrics};

use crate::config::TrackerConfig;
use crate::output::{print_error, LogFormat, OutputFormat};

/// TKGI Application Tracker CLI
#[derive(Parser)]
#[command(name = "tkgi-tracker")]
#[command(author, version, about = "TKGI Application Tracker", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ~/.config/tkgi-tracker/config.json)
    #[arg(long, global = true, env = "TRACKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Log line format
    #[arg(long, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Write Prometheus metrics to this file when the run finishes
    #[arg(long, global = true)]
    pub metrics_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate raw cluster data into application, cluster and summary JSON
    Aggregate(RunArgs),

    /// Aggregate raw cluster data and write the CSV report tables
    Report(RunArgs),

    /// Merge per-foundation reports into one cross-foundation dataset
    Consolidate {
        /// Directory holding one subdirectory of reports per foundation
        reports_root: PathBuf,

        /// Output directory (defaults to <REPORTS_ROOT>/consolidated)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn init_logging(format: LogFormat, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(std::io::stderr)).init(),
        LogFormat::Text => registry.with(fmt::layer().with_writer(std::io::stderr)).init(),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = TrackerConfig::load(cli.config.as_deref())?;
    let metrics = TrackerMetrics::new();

    match &cli.command {
        Commands::Aggregate(args) => {
            let logger = StructuredLogger::new("aggregate");
            commands::aggregate::run(args, &config, &metrics, &logger, cli.format)?;
        }
        Commands::Report(args) => {
            let logger = StructuredLogger::new("report");
            commands::report::run(args, &config, &metrics, &logger, cli.format)?;
        }
        Commands::Consolidate { reports_root, output } => {
            let logger = StructuredLogger::new("consolidate");
            commands::consolidate::run(reports_root, output.clone(), &metrics, &logger, cli.format)?;
        }
    }

    if let Some(path) = &cli.metrics_file {
        std::fs::write(path, metrics.render())
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
        info!(path = %path.display(), "Wrote metrics");
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
