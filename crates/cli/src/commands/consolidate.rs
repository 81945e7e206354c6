//! `consolidate`: merge per-foundation CSV reports into one dataset

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tabled::Tabled;
use tracing::info;
use tracker_lib::consolidate::{discover_foundation_reports, ConsolidationMetadata};
use tracker_lib::{consolidate, ReportKind, StructuredLogger, TrackerMetrics};

use super::print_warnings;
use crate::output::{
    file_timestamp, output_path, print_json, print_success, print_table, write_csv,
    write_json, OutputFormat,
};

/// Subdirectory used when no output directory is given
const DEFAULT_OUTPUT_SUBDIR: &str = "consolidated";

#[derive(Tabled)]
struct FoundationRow {
    #[tabled(rename = "Foundation")]
    foundation: String,
    #[tabled(rename = "Applications")]
    applications: usize,
    #[tabled(rename = "Active")]
    active: usize,
    #[tabled(rename = "Source")]
    source: String,
}

pub fn run(
    reports_root: &Path,
    output_dir: Option<PathBuf>,
    metrics: &TrackerMetrics,
    logger: &StructuredLogger,
    format: OutputFormat,
) -> Result<()> {
    let discovered = discover_foundation_reports(reports_root)
        .with_context(|| format!("Failed to read foundation reports in {}", reports_root.display()))?;

    for (foundation, reports) in &discovered {
        for (kind, reason) in reports.failures() {
            metrics.inc_foundation_load_failures();
            logger.log_foundation_skipped(foundation, kind.as_str(), reason);
        }
    }

    let dataset = consolidate(&discovered)?;
    let metadata = ConsolidationMetadata::new(&dataset, Utc::now());

    metrics.add_foundations_consolidated(dataset.foundation_stats.len());
    logger.log_consolidation_completed(
        metadata.total_foundations,
        metadata.total_applications,
        dataset.warnings.len(),
    );

    let output_dir = output_dir.unwrap_or_else(|| reports_root.join(DEFAULT_OUTPUT_SUBDIR));
    let stamp = file_timestamp(metadata.consolidation_timestamp);

    let mut written = Vec::new();
    for kind in ReportKind::ALL {
        let table = dataset.table(kind);
        if table.is_empty() {
            info!(kind = %kind, "No consolidated rows, skipping file");
            continue;
        }
        let path = output_path(&output_dir, &format!("consolidated_{}", kind), &stamp, "csv");
        write_csv(&path, table)?;
        written.push(path);
    }
    let metadata_path = output_path(&output_dir, "consolidation_metadata", &stamp, "json");
    write_json(&metadata_path, &metadata)?;
    written.push(metadata_path);

    match format {
        OutputFormat::Json => print_json(&metadata)?,
        OutputFormat::Table => {
            println!("{}", "Consolidation Summary".bold());
            println!("{}", "=".repeat(50));
            println!("Foundations:            {}", metadata.total_foundations);
            println!("Total Applications:     {}", metadata.total_applications);
            println!(
                "Active Applications:    {}",
                metadata.total_active_applications.to_string().green()
            );
            println!();

            let rows: Vec<FoundationRow> = dataset
                .foundation_stats
                .iter()
                .map(|(foundation, stats)| FoundationRow {
                    foundation: foundation.clone(),
                    applications: stats.total_applications,
                    active: stats.active_applications,
                    source: stats.source.clone(),
                })
                .collect();
            print_table(&rows);
            print_warnings(&dataset.warnings);
            println!();
            for path in &written {
                print_success(&format!("Wrote {}", path.display()));
            }
        }
    }

    Ok(())
}
