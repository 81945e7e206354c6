//! Cross-foundation consolidation
//!
//! Each foundation produces its own report tables independently. This module
//! merges them into one dataset per report kind without dropping or
//! deduplicating rows, and re-derives the executive summary from the merged
//! application rows.

mod discovery;
mod table;

#[cfg(test)]
mod tests;

pub use discovery::{discover_foundation_reports, SKIPPED_DIRECTORIES};
pub use table::{compare_text, format_number, normalize_column_name, parse_number, Table};

use crate::error::{Result, TrackerError};
use crate::scoring::READY_THRESHOLD;
use crate::summary::EnvironmentCategory;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

pub const FOUNDATION_COLUMN: &str = "foundation";
pub const TOTAL_LABEL: &str = "TOTAL";

const APP_ID_COLUMNS: &[&str] = &["app_id", "application_id"];
const READINESS_COLUMNS: &[&str] = &[
    "migration_readiness",
    "migration_readiness_score",
    "migration_score",
];

/// The four report kinds every foundation may publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Applications,
    Clusters,
    MigrationPriority,
    ExecutiveSummary,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Applications,
        ReportKind::Clusters,
        ReportKind::MigrationPriority,
        ReportKind::ExecutiveSummary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Applications => "applications",
            ReportKind::Clusters => "clusters",
            ReportKind::MigrationPriority => "migration_priority",
            ReportKind::ExecutiveSummary => "executive_summary",
        }
    }

    /// File name stem a per-foundation report of this kind is written under
    pub fn file_stem(&self) -> &'static str {
        match self {
            ReportKind::Applications => "application_report",
            ReportKind::Clusters => "cluster_report",
            ReportKind::MigrationPriority => "migration_priority",
            ReportKind::ExecutiveSummary => "executive_summary",
        }
    }

    /// Recognise a per-foundation report file by its name
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let name = file_name.to_lowercase();
        if name.contains("application_report") {
            Some(ReportKind::Applications)
        } else if name.contains("cluster_report") {
            Some(ReportKind::Clusters)
        } else if name.contains("executive_summary") {
            Some(ReportKind::ExecutiveSummary)
        } else if name.contains("migration_priority") {
            Some(ReportKind::MigrationPriority)
        } else {
            None
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of loading one report file
#[derive(Debug, Clone, PartialEq)]
pub enum ReportSource {
    Loaded { table: Table, origin: String },
    Failed { origin: String, reason: String },
}

impl ReportSource {
    pub fn loaded(table: Table, origin: impl Into<String>) -> Self {
        Self::Loaded {
            table,
            origin: origin.into(),
        }
    }
}

/// Whatever one foundation published, by kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FoundationReports {
    reports: BTreeMap<ReportKind, ReportSource>,
}

impl FoundationReports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: ReportKind, source: ReportSource) -> Self {
        self.insert(kind, source);
        self
    }

    pub fn insert(&mut self, kind: ReportKind, source: ReportSource) {
        self.reports.insert(kind, source);
    }

    pub fn get(&self, kind: ReportKind) -> Option<&ReportSource> {
        self.reports.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Kinds whose report file could not be loaded, with the reason
    pub fn failures(&self) -> impl Iterator<Item = (ReportKind, &str)> + '_ {
        self.reports.iter().filter_map(|(kind, source)| match source {
            ReportSource::Failed { reason, .. } => Some((*kind, reason.as_str())),
            ReportSource::Loaded { .. } => None,
        })
    }
}

/// Per-foundation facts recorded while consolidating application reports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoundationStats {
    pub total_applications: usize,
    pub active_applications: usize,
    pub source: String,
}

/// Merged output of every foundation's reports
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsolidatedDataset {
    pub applications: Table,
    pub clusters: Table,
    pub migration_priority: Table,
    pub executive_summary: Table,
    pub foundation_stats: BTreeMap<String, FoundationStats>,
    pub warnings: Vec<String>,
}

impl ConsolidatedDataset {
    pub fn table(&self, kind: ReportKind) -> &Table {
        match kind {
            ReportKind::Applications => &self.applications,
            ReportKind::Clusters => &self.clusters,
            ReportKind::MigrationPriority => &self.migration_priority,
            ReportKind::ExecutiveSummary => &self.executive_summary,
        }
    }
}

/// Envelope describing a consolidation run
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationMetadata {
    pub consolidation_timestamp: DateTime<Utc>,
    pub foundations_processed: Vec<String>,
    pub foundation_stats: BTreeMap<String, FoundationStats>,
    pub row_counts: BTreeMap<ReportKind, usize>,
    pub total_foundations: usize,
    pub total_applications: usize,
    pub total_active_applications: usize,
    pub warnings: Vec<String>,
}

impl ConsolidationMetadata {
    pub fn new(dataset: &ConsolidatedDataset, timestamp: DateTime<Utc>) -> Self {
        Self {
            consolidation_timestamp: timestamp,
            foundations_processed: dataset.foundation_stats.keys().cloned().collect(),
            foundation_stats: dataset.foundation_stats.clone(),
            row_counts: ReportKind::ALL
                .iter()
                .map(|kind| (*kind, dataset.table(*kind).len()))
                .collect(),
            total_foundations: dataset.foundation_stats.len(),
            total_applications: dataset
                .foundation_stats
                .values()
                .map(|s| s.total_applications)
                .sum(),
            total_active_applications: dataset
                .foundation_stats
                .values()
                .map(|s| s.active_applications)
                .sum(),
            warnings: dataset.warnings.clone(),
        }
    }
}

/// A foundation's table for one kind after header normalization
struct Normalized<'a> {
    foundation: &'a str,
    origin: &'a str,
    table: Table,
}

/// Merge per-foundation reports into one dataset.
///
/// Fails only when there is nothing to consolidate at all or when not a
/// single foundation yielded usable application rows. Every other problem
/// becomes a warning on the returned dataset.
pub fn consolidate(inputs: &BTreeMap<String, FoundationReports>) -> Result<ConsolidatedDataset> {
    if inputs.is_empty() {
        return Err(TrackerError::MissingData(
            "no foundation reports found to consolidate".to_string(),
        ));
    }

    let mut warnings = Vec::new();

    let applications = collect_kind(inputs, ReportKind::Applications, &mut warnings);
    if applications.is_empty() {
        return Err(TrackerError::MissingData(
            "no application data could be loaded from any foundation".to_string(),
        ));
    }
    let clusters = collect_kind(inputs, ReportKind::Clusters, &mut warnings);
    let migration = collect_kind(inputs, ReportKind::MigrationPriority, &mut warnings);
    // Published summaries are only checked for presence; the merged summary
    // is always recomputed from application rows
    let _published = collect_kind(inputs, ReportKind::ExecutiveSummary, &mut warnings);

    let foundation_stats: BTreeMap<String, FoundationStats> = applications
        .iter()
        .map(|n| {
            (
                n.foundation.to_string(),
                FoundationStats {
                    total_applications: n.table.len(),
                    active_applications: n
                        .table
                        .rows()
                        .iter()
                        .filter(|r| is_active_row(&n.table, r))
                        .count(),
                    source: n.origin.to_string(),
                },
            )
        })
        .collect();

    let executive_summary = executive_summary(&applications, &clusters);

    let mut merged_apps = Table::concat(applications.iter().map(|n| &n.table));
    sort_applications(&mut merged_apps);

    let mut merged_clusters = Table::concat(clusters.iter().map(|n| &n.table));
    sort_clusters(&mut merged_clusters);

    let mut merged_migration = Table::concat(migration.iter().map(|n| &n.table));
    sort_migration_priority(&mut merged_migration);

    info!(
        foundations = foundation_stats.len(),
        applications = merged_apps.len(),
        clusters = merged_clusters.len(),
        migration_candidates = merged_migration.len(),
        warnings = warnings.len(),
        "Consolidation complete"
    );

    Ok(ConsolidatedDataset {
        applications: merged_apps,
        clusters: merged_clusters,
        migration_priority: merged_migration,
        executive_summary,
        foundation_stats,
        warnings,
    })
}

/// Usable tables of one kind, normalized and tagged with their foundation
fn collect_kind<'a>(
    inputs: &'a BTreeMap<String, FoundationReports>,
    kind: ReportKind,
    warnings: &mut Vec<String>,
) -> Vec<Normalized<'a>> {
    let mut collected = Vec::new();

    for (foundation, reports) in inputs {
        match reports.get(kind) {
            None => {
                warn!(foundation = %foundation, kind = %kind, "No report of this kind");
                warnings.push(format!("{foundation}: no {kind} report found"));
            }
            Some(ReportSource::Failed { origin, reason }) => {
                let err = TrackerError::partial(origin.clone(), reason);
                warn!(foundation = %foundation, kind = %kind, error = %err, "Skipping unreadable report");
                warnings.push(format!("{foundation}: {err}"));
            }
            Some(ReportSource::Loaded { table, origin }) => {
                let mut table = table.clone();
                table.normalize_headers();
                table.ensure_column(FOUNDATION_COLUMN, foundation);
                info!(foundation = %foundation, kind = %kind, rows = table.len(), "Loaded report");
                collected.push(Normalized {
                    foundation: foundation.as_str(),
                    origin: origin.as_str(),
                    table,
                });
            }
        }
    }

    if collected.is_empty() {
        warn!(kind = %kind, "No foundation supplied usable data");
    }
    collected
}

fn is_active_row(table: &Table, row: &[String]) -> bool {
    if let Some(flag) = table.cell(row, "is_active") {
        return matches!(flag.trim().to_lowercase().as_str(), "true" | "1" | "yes");
    }
    table
        .cell(row, "status")
        .is_some_and(|status| status.trim().eq_ignore_ascii_case("active"))
}

fn readiness(table: &Table, row: &[String]) -> Option<f64> {
    table
        .first_column(READINESS_COLUMNS)
        .and_then(|idx| parse_number(&row[idx]))
}

/// One row per foundation recomputed from its application rows, then a
/// `TOTAL` row
fn executive_summary(applications: &[Normalized<'_>], clusters: &[Normalized<'_>]) -> Table {
    let mut summary = Table::new([
        FOUNDATION_COLUMN,
        "total_applications",
        "active_applications",
        "inactive_applications",
        "production_applications",
        "migration_ready_apps",
        "total_clusters",
        "total_pods",
        "report_file",
    ]);

    for n in applications {
        let table = &n.table;
        let rows = table.rows();

        let active = rows.iter().filter(|r| is_active_row(table, r)).count();
        let production = rows
            .iter()
            .filter(|r| {
                table.cell(r, "environment").and_then(EnvironmentCategory::classify)
                    == Some(EnvironmentCategory::Production)
            })
            .count();
        let ready = rows
            .iter()
            .filter(|r| readiness(table, r).is_some_and(|s| s >= f64::from(READY_THRESHOLD)))
            .count();
        let pods: f64 = rows
            .iter()
            .filter_map(|r| table.cell(r, "total_pods").and_then(parse_number))
            .sum();
        let cluster_count = clusters
            .iter()
            .filter(|c| c.foundation == n.foundation)
            .map(|c| c.table.len())
            .sum::<usize>();

        summary.push_row([
            n.foundation.to_string(),
            rows.len().to_string(),
            active.to_string(),
            (rows.len() - active).to_string(),
            production.to_string(),
            ready.to_string(),
            cluster_count.to_string(),
            format_number(pods),
            file_name(n.origin),
        ]);
    }

    let mut totals = summary.totals_row(FOUNDATION_COLUMN, TOTAL_LABEL);
    if let Some(idx) = summary.column("report_file") {
        totals[idx] = "Combined".to_string();
    }
    summary.push_row(totals);
    summary
}

fn file_name(origin: &str) -> String {
    std::path::Path::new(origin)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| origin.to_string())
}

fn sort_by_text_columns(table: &mut Table, columns: &[Option<usize>]) {
    let columns: Vec<usize> = columns.iter().flatten().copied().collect();
    table.sort_rows_by(|a, b| {
        columns
            .iter()
            .map(|&idx| compare_text(&a[idx], &b[idx]))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

/// `(foundation, application id)` ascending
fn sort_applications(table: &mut Table) {
    let keys = [table.column(FOUNDATION_COLUMN), table.first_column(APP_ID_COLUMNS)];
    sort_by_text_columns(table, &keys);
}

/// `(foundation, cluster)` ascending
fn sort_clusters(table: &mut Table) {
    let keys = [table.column(FOUNDATION_COLUMN), table.column("cluster")];
    sort_by_text_columns(table, &keys);
}

/// Readiness descending (unscored rows last), then foundation ascending
fn sort_migration_priority(table: &mut Table) {
    let foundation_idx = table.column(FOUNDATION_COLUMN);
    let Some(score_idx) = table.first_column(READINESS_COLUMNS) else {
        sort_by_text_columns(table, &[foundation_idx]);
        return;
    };

    table.sort_rows_by(|a, b| {
        let by_score = match (parse_number(&a[score_idx]), parse_number(&b[score_idx])) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_score.then_with(|| match foundation_idx {
            Some(idx) => compare_text(&a[idx], &b[idx]),
            None => Ordering::Equal,
        })
    });
}
