//! Per-foundation report tables
//!
//! Renders an aggregation into the flat CSV tables a foundation publishes
//! and the consolidator later reads back.

use crate::aggregate::Aggregation;
use crate::consolidate::{ReportKind, Table};
use crate::models::{ApplicationRecord, ClusterRecord, SummaryReport};
use crate::scoring::{Complexity, MigrationAction};
use crate::summary::EnvironmentCategory;
use serde::Serialize;

const HIGH_UTILIZATION_PODS: u64 = 100;
const MEDIUM_UTILIZATION_PODS: u64 = 50;
const DECOMMISSION_AFTER_DAYS: i64 = 60;

/// The four tables produced for one foundation's run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSet {
    pub applications: Table,
    pub clusters: Table,
    pub migration_priority: Table,
    pub executive_summary: Table,
}

impl ReportSet {
    pub fn build(aggregation: &Aggregation, summary: &SummaryReport) -> Self {
        let applications = aggregation.application_list();
        Self {
            applications: application_report(&applications),
            clusters: cluster_report(&aggregation.cluster_list()),
            migration_priority: migration_priority_report(&applications),
            executive_summary: executive_summary_report(summary),
        }
    }

    pub fn table(&self, kind: ReportKind) -> &Table {
        match kind {
            ReportKind::Applications => &self.applications,
            ReportKind::Clusters => &self.clusters,
            ReportKind::MigrationPriority => &self.migration_priority,
            ReportKind::ExecutiveSummary => &self.executive_summary,
        }
    }
}

/// Everything a report run produced, written as one JSON document
#[derive(Debug, Clone, Serialize)]
pub struct CombinedReport<'a> {
    pub summary: &'a SummaryReport,
    pub applications: Vec<&'a ApplicationRecord>,
    pub clusters: Vec<&'a ClusterRecord>,
    pub migration_priority: &'a Table,
}

impl<'a> CombinedReport<'a> {
    pub fn new(aggregation: &'a Aggregation, summary: &'a SummaryReport, reports: &'a ReportSet) -> Self {
        Self {
            summary,
            applications: aggregation.application_list(),
            clusters: aggregation.cluster_list(),
            migration_priority: &reports.migration_priority,
        }
    }
}

/// `Mixed` for several environments, the single one title-cased, `Unknown`
/// when none was recorded
pub fn environment_label(app: &ApplicationRecord) -> String {
    match app.environments.as_slice() {
        [] => "Unknown".to_string(),
        [single] => title_case(single),
        _ => "Mixed".to_string(),
    }
}

fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => "Unknown".to_string(),
    }
}

pub fn status_label(app: &ApplicationRecord) -> &'static str {
    if app.is_active {
        "Active"
    } else {
        "Inactive"
    }
}

pub fn utilization(total_pods: u64) -> &'static str {
    if total_pods > HIGH_UTILIZATION_PODS {
        "High"
    } else if total_pods > MEDIUM_UTILIZATION_PODS {
        "Medium"
    } else {
        "Low"
    }
}

/// Advice shown next to each application
pub fn recommendation(app: &ApplicationRecord) -> &'static str {
    let score = app.migration_readiness;
    let idle_days = app.days_since_activity.unwrap_or(0);

    match score {
        80.. if !app.is_active => "Immediate migration candidate - inactive app",
        80.. => "Good migration candidate - plan coordination",
        60.. if idle_days > DECOMMISSION_AFTER_DAYS => {
            "Consider decommissioning if no longer needed"
        }
        60.. => "Moderate complexity - needs planning",
        40.. => "Complex migration - detailed analysis required",
        _ if app.is_active && EnvironmentCategory::Production.touches(app) => {
            "Critical app - careful migration planning needed"
        }
        _ => "High complexity - consider phased approach",
    }
}

fn or_blank(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One row per application, sorted by application id
pub fn application_report(applications: &[&ApplicationRecord]) -> Table {
    let mut table = Table::new([
        "Application ID",
        "Status",
        "Environment",
        "Foundations",
        "Clusters",
        "Namespaces",
        "Total Pods",
        "Running Pods",
        "Deployments",
        "Services",
        "Last Activity",
        "Days Since Activity",
        "Migration Readiness Score",
        "Data Quality",
        "Recommendation",
    ]);

    let mut sorted = applications.to_vec();
    sorted.sort_by(|a, b| a.app_id.cmp(&b.app_id));

    for app in sorted {
        table.push_row([
            app.app_id.clone(),
            status_label(app).to_string(),
            environment_label(app),
            app.foundations.join(", "),
            app.clusters.join(", "),
            app.namespaces.join(", "),
            app.total_pods.to_string(),
            app.running_pods.to_string(),
            app.total_deployments.to_string(),
            app.total_services.to_string(),
            or_blank(app.last_activity.as_deref()),
            or_blank(app.days_since_activity),
            app.migration_readiness.to_string(),
            app.data_quality.as_str().to_string(),
            recommendation(app).to_string(),
        ]);
    }
    table
}

pub fn cluster_report(clusters: &[&ClusterRecord]) -> Table {
    let mut table = Table::new([
        "Cluster",
        "Foundation",
        "Environment",
        "Total Namespaces",
        "Application Namespaces",
        "System Namespaces",
        "Total Applications",
        "Total Pods",
        "Running Pods",
        "Utilization",
    ]);

    for cluster in clusters {
        table.push_row([
            cluster.cluster.clone(),
            cluster.foundation.clone(),
            cluster.environment.clone(),
            cluster.total_namespaces.to_string(),
            cluster.app_namespaces.to_string(),
            cluster.system_namespaces.to_string(),
            cluster.application_count.to_string(),
            cluster.total_pods.to_string(),
            cluster.running_pods.to_string(),
            utilization(cluster.total_pods).to_string(),
        ]);
    }
    table
}

/// Applications ranked by readiness, best candidates first
pub fn migration_priority_report(applications: &[&ApplicationRecord]) -> Table {
    let mut table = Table::new([
        "Priority",
        "Application ID",
        "Migration Score",
        "Status",
        "Environment",
        "Complexity",
        "Action Required",
    ]);

    let mut ranked = applications.to_vec();
    ranked.sort_by(|a, b| {
        b.migration_readiness
            .cmp(&a.migration_readiness)
            .then_with(|| a.app_id.cmp(&b.app_id))
    });

    for (rank, app) in ranked.into_iter().enumerate() {
        table.push_row([
            (rank + 1).to_string(),
            app.app_id.clone(),
            app.migration_readiness.to_string(),
            status_label(app).to_string(),
            environment_label(app),
            Complexity::of(app).as_str().to_string(),
            MigrationAction::for_score(app.migration_readiness)
                .description()
                .to_string(),
        ]);
    }
    table
}

/// Per-foundation application counts
pub fn executive_summary_report(summary: &SummaryReport) -> Table {
    let mut table = Table::new(["Foundation", "Total Applications", "Active", "Inactive"]);
    for (foundation, breakdown) in &summary.by_foundation {
        table.push_row([
            foundation.clone(),
            breakdown.applications.to_string(),
            breakdown.active.to_string(),
            breakdown.inactive.to_string(),
        ]);
    }
    table
}
