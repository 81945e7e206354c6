//! `aggregate`: raw snapshots to application, cluster and summary JSON

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;
use tracker_lib::{StructuredLogger, SummaryReport, TrackerMetrics};

use super::{print_warnings, run_tracker, RunArgs};
use crate::config::TrackerConfig;
use crate::output::{file_timestamp, output_path, print_json, print_success, print_table, write_json, OutputFormat};

/// Row for the per-foundation breakdown table
#[derive(Tabled)]
struct FoundationRow {
    #[tabled(rename = "Foundation")]
    foundation: String,
    #[tabled(rename = "Applications")]
    applications: usize,
    #[tabled(rename = "Active")]
    active: usize,
    #[tabled(rename = "Inactive")]
    inactive: usize,
}

pub fn run(
    args: &RunArgs,
    config: &TrackerConfig,
    metrics: &TrackerMetrics,
    logger: &StructuredLogger,
    format: OutputFormat,
) -> Result<()> {
    let run = run_tracker(args, config, metrics, logger)?;
    let reports_dir = args.reports_dir(config);
    let stamp = file_timestamp(run.summary.timestamp);

    let applications = output_path(&reports_dir, "applications", &stamp, "json");
    let clusters = output_path(&reports_dir, "clusters", &stamp, "json");
    let summary = output_path(&reports_dir, "summary", &stamp, "json");
    write_json(&applications, &run.aggregation.application_list())?;
    write_json(&clusters, &run.aggregation.cluster_list())?;
    write_json(&summary, &run.summary)?;

    match format {
        OutputFormat::Json => print_json(&run.summary)?,
        OutputFormat::Table => {
            print_executive_summary(&run.summary);
            print_warnings(&run.warnings);
            println!();
            for path in [&applications, &clusters, &summary] {
                print_success(&format!("Wrote {}", path.display()));
            }
        }
    }

    Ok(())
}

/// Executive summary as shown on the terminal
pub fn print_executive_summary(summary: &SummaryReport) {
    let totals = &summary.totals;
    let migration = &summary.migration;

    println!("{}", "TKGI Application Tracker - Executive Summary".bold());
    println!("{}", "=".repeat(50));
    println!("Total Applications:     {}", totals.applications);
    println!(
        "  Active:               {}",
        totals.active_applications.to_string().green()
    );
    println!(
        "  Inactive:             {}",
        totals.inactive_applications.to_string().dimmed()
    );
    println!("  Production:           {}", totals.production_applications);
    println!("  Non-Production:       {}", totals.nonproduction_applications);
    println!("  Lab:                  {}", totals.lab_applications);
    println!("Total Clusters:         {}", totals.clusters);
    println!("Total Pods:             {}", totals.total_pods);
    println!();

    println!("{}", "Migration Readiness".bold());
    println!("{}", "-".repeat(50));
    println!(
        "Ready for Migration:    {}",
        migration.ready_for_migration.to_string().green().bold()
    );
    println!(
        "Needs Planning:         {}",
        migration.needs_planning.to_string().yellow()
    );
    println!(
        "Needs Metadata Review:  {}",
        migration.needs_metadata_analysis.to_string().red()
    );
    println!();

    let rows: Vec<FoundationRow> = summary
        .by_foundation
        .iter()
        .map(|(foundation, breakdown)| FoundationRow {
            foundation: foundation.clone(),
            applications: breakdown.applications,
            active: breakdown.active,
            inactive: breakdown.inactive,
        })
        .collect();
    println!("{}", "By Foundation".bold());
    print_table(&rows);
}
