//! CLI subcommands

pub mod aggregate;
pub mod consolidate;
pub mod report;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;
use tracker_lib::loader::{self, LoadedRecords};
use tracker_lib::{Aggregation, Aggregator, StructuredLogger, SummaryBuilder, SummaryReport, TrackerMetrics};

use crate::config::TrackerConfig;
use crate::output::print_warning;

/// Input and output locations shared by `aggregate` and `report`
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory holding raw cluster snapshots
    #[arg(long, env = "TRACKER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory reports are written to
    #[arg(long, env = "TRACKER_REPORTS_DIR")]
    pub reports_dir: Option<PathBuf>,

    /// Explicit snapshot files to load instead of the latest one
    #[arg(long = "input", short, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
}

impl RunArgs {
    pub fn reports_dir(&self, config: &TrackerConfig) -> PathBuf {
        self.reports_dir
            .clone()
            .unwrap_or_else(|| config.reports_dir.clone())
    }
}

/// Result of loading, aggregating and summarizing one batch
pub struct TrackerRun {
    pub aggregation: Aggregation,
    pub summary: SummaryReport,
    pub warnings: Vec<String>,
}

/// Load raw records and run them through aggregation and the summary builder
pub fn run_tracker(
    args: &RunArgs,
    config: &TrackerConfig,
    metrics: &TrackerMetrics,
    logger: &StructuredLogger,
) -> Result<TrackerRun> {
    let loaded = if args.inputs.is_empty() {
        let data_dir = args.data_dir.as_ref().unwrap_or(&config.data_dir);
        loader::load_latest(data_dir, &config.raw_file_prefix)
    } else {
        loader::load_files(&args.inputs)
    };
    let loaded: LoadedRecords = loaded.context("Failed to load cluster data")?;

    for warning in &loaded.warnings {
        logger.log_record_skipped("cluster data", warning);
    }
    metrics.add_records_skipped(loaded.skipped() as u64);

    let started = Instant::now();
    let aggregator = Aggregator::new();
    let aggregation = aggregator.run(&loaded.records);
    let summary = SummaryBuilder::new()
        .with_known_foundations(config.known_foundations.iter().cloned())
        .with_timestamp(aggregator.reference_time())
        .build_from(&aggregation);
    let elapsed = started.elapsed().as_secs_f64();

    metrics.observe_aggregation_latency(elapsed);
    metrics.add_records_processed(aggregation.records_processed as u64);
    metrics.record_aggregation(aggregation.applications.len(), aggregation.clusters.len());
    logger.log_aggregation_completed(
        aggregation.records_processed,
        aggregation.applications.len(),
        aggregation.clusters.len(),
        aggregation.system_namespaces,
        elapsed,
    );

    Ok(TrackerRun {
        aggregation,
        summary,
        warnings: loaded.warnings,
    })
}

pub fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    print_warning(&format!("{} input problem(s) were skipped:", warnings.len()));
    for warning in warnings {
        println!("  - {}", warning);
    }
}
