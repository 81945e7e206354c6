//! `report`: raw snapshots to the per-foundation CSV report tables

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;
use tracker_lib::report::CombinedReport;
use tracker_lib::{ReportKind, ReportSet, StructuredLogger, TrackerMetrics};

use super::aggregate::print_executive_summary;
use super::{print_warnings, run_tracker, RunArgs};
use crate::config::TrackerConfig;
use crate::output::{
    color_score, color_status, file_timestamp, output_path, print_info, print_json, print_success,
    print_table, write_csv, write_json, OutputFormat,
};

/// Number of migration candidates listed on the terminal
const TOP_CANDIDATES: usize = 10;

#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Application")]
    app_id: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Action")]
    action: String,
}

pub fn run(
    args: &RunArgs,
    config: &TrackerConfig,
    metrics: &TrackerMetrics,
    logger: &StructuredLogger,
    format: OutputFormat,
) -> Result<()> {
    let run = run_tracker(args, config, metrics, logger)?;
    let reports = ReportSet::build(&run.aggregation, &run.summary);

    let reports_dir = args.reports_dir(config);
    let stamp = file_timestamp(run.summary.timestamp);

    let mut written = Vec::new();
    for kind in ReportKind::ALL {
        let path = output_path(&reports_dir, kind.file_stem(), &stamp, "csv");
        write_csv(&path, reports.table(kind))?;
        written.push(path);
    }
    let combined = output_path(&reports_dir, "tracker_report", &stamp, "json");
    write_json(&combined, &CombinedReport::new(&run.aggregation, &run.summary, &reports))?;
    written.push(combined);

    match format {
        OutputFormat::Json => print_json(&CombinedReport::new(&run.aggregation, &run.summary, &reports))?,
        OutputFormat::Table => {
            print_executive_summary(&run.summary);
            println!();
            print_top_candidates(&run.aggregation.application_list());
            print_warnings(&run.warnings);
            println!();
            for path in &written {
                print_success(&format!("Wrote {}", path.display()));
            }
        }
    }

    Ok(())
}

fn print_top_candidates(applications: &[&tracker_lib::ApplicationRecord]) {
    let mut ranked = applications.to_vec();
    ranked.sort_by(|a, b| {
        b.migration_readiness
            .cmp(&a.migration_readiness)
            .then_with(|| a.app_id.cmp(&b.app_id))
    });

    println!("{}", "Top Migration Candidates".bold());
    if ranked.is_empty() {
        print_info("No applications found");
        return;
    }

    let rows: Vec<CandidateRow> = ranked
        .iter()
        .take(TOP_CANDIDATES)
        .enumerate()
        .map(|(i, app)| CandidateRow {
            priority: (i + 1).to_string(),
            app_id: app.app_id.clone(),
            score: color_score(app.migration_readiness),
            status: color_status(tracker_lib::report::status_label(app)),
            action: tracker_lib::scoring::MigrationAction::for_score(app.migration_readiness)
                .description()
                .to_string(),
        })
        .collect();
    print_table(&rows);
}
