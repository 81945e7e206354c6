//! Executive summary of an aggregation run

use crate::aggregate::Aggregation;
use crate::models::{
    ApplicationRecord, ClusterRecord, DataQuality, FoundationBreakdown, MigrationSummary,
    SummaryReport, SummaryTotals,
};
use crate::scoring;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Coarse environment buckets used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentCategory {
    Production,
    NonProduction,
    Lab,
}

impl EnvironmentCategory {
    /// Case-insensitive, so title-cased report cells classify like raw values.
    /// Production is the literal `production` the readiness scorer penalises.
    pub fn classify(environment: &str) -> Option<Self> {
        match environment.trim().to_ascii_lowercase().as_str() {
            "production" => Some(Self::Production),
            "nonprod" | "non-production" | "nonproduction" => Some(Self::NonProduction),
            "lab" => Some(Self::Lab),
            _ => None,
        }
    }

    /// An application counts towards every category any of its
    /// environments falls into.
    pub fn touches(self, app: &ApplicationRecord) -> bool {
        app.environments
            .iter()
            .any(|env| Self::classify(env) == Some(self))
    }
}

/// Builds [`SummaryReport`]s; never mutates its inputs
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    known_foundations: Vec<String>,
    timestamp: DateTime<Utc>,
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryBuilder {
    pub fn new() -> Self {
        Self {
            known_foundations: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Foundations to report even when no application lives in them
    pub fn with_known_foundations(mut self, foundations: impl IntoIterator<Item = String>) -> Self {
        self.known_foundations = foundations.into_iter().collect();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn build<'a, A, C>(&self, applications: A, clusters: C) -> SummaryReport
    where
        A: IntoIterator<Item = &'a ApplicationRecord>,
        C: IntoIterator<Item = &'a ClusterRecord>,
    {
        let applications: Vec<&ApplicationRecord> = applications.into_iter().collect();
        let clusters: Vec<&ClusterRecord> = clusters.into_iter().collect();

        let count = |pred: &dyn Fn(&ApplicationRecord) -> bool| {
            applications.iter().copied().filter(|app| pred(*app)).count()
        };

        let active = count(&|app: &ApplicationRecord| app.is_active);

        let totals = SummaryTotals {
            applications: applications.len(),
            active_applications: active,
            inactive_applications: applications.len() - active,
            production_applications: count(&|app: &ApplicationRecord| {
                EnvironmentCategory::Production.touches(app)
            }),
            nonproduction_applications: count(&|app: &ApplicationRecord| {
                EnvironmentCategory::NonProduction.touches(app)
            }),
            lab_applications: count(&|app: &ApplicationRecord| EnvironmentCategory::Lab.touches(app)),
            clusters: clusters.len(),
            total_pods: clusters.iter().map(|c| c.total_pods).sum(),
        };

        let migration = MigrationSummary {
            ready_for_migration: count(&|app: &ApplicationRecord| scoring::is_ready(app)),
            needs_planning: active,
            needs_metadata_analysis: count(&|app: &ApplicationRecord| {
                app.data_quality == DataQuality::Incomplete
            }),
        };

        let foundations: BTreeSet<&str> = self
            .known_foundations
            .iter()
            .map(String::as_str)
            .chain(
                applications
                    .iter()
                    .flat_map(|app| app.foundations.iter().map(String::as_str)),
            )
            .collect();

        let by_foundation: BTreeMap<String, FoundationBreakdown> = foundations
            .into_iter()
            .map(|foundation| {
                let members = applications.iter().filter(|app| app.in_foundation(foundation));
                let (active, inactive) = members.fold((0, 0), |(a, i), app| {
                    if app.is_active {
                        (a + 1, i)
                    } else {
                        (a, i + 1)
                    }
                });
                (
                    foundation.to_string(),
                    FoundationBreakdown {
                        applications: active + inactive,
                        active,
                        inactive,
                    },
                )
            })
            .collect();

        SummaryReport {
            timestamp: self.timestamp,
            totals,
            migration,
            by_foundation,
        }
    }

    pub fn build_from(&self, aggregation: &Aggregation) -> SummaryReport {
        self.build(aggregation.applications.values(), aggregation.clusters.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str, active: bool, envs: &[&str], foundations: &[&str], score: u8) -> ApplicationRecord {
        ApplicationRecord {
            app_id: id.into(),
            is_active: active,
            last_activity: None,
            days_since_activity: None,
            foundations: foundations.iter().map(|s| s.to_string()).collect(),
            clusters: vec![],
            namespaces: vec![id.into()],
            environments: envs.iter().map(|s| s.to_string()).collect(),
            total_pods: 1,
            running_pods: 1,
            total_deployments: 1,
            total_services: 1,
            data_quality: DataQuality::Complete,
            migration_readiness: score,
        }
    }

    const NO_APPS: &[ApplicationRecord] = &[];
    const NO_CLUSTERS: &[ClusterRecord] = &[];

    fn cluster(name: &str, pods: u64) -> ClusterRecord {
        ClusterRecord {
            cluster: name.into(),
            foundation: "dc01".into(),
            environment: "lab".into(),
            total_namespaces: 1,
            app_namespaces: 1,
            system_namespaces: 0,
            applications: vec![],
            application_count: 0,
            total_pods: pods,
            running_pods: pods,
        }
    }

    #[test]
    fn test_environment_counts_overlap() {
        let apps = vec![
            app("a", true, &["production", "nonprod"], &["dc01"], 20),
            app("b", false, &["lab"], &["dc01"], 90),
            app("c", false, &["unknown"], &["dc02"], 70),
        ];
        let summary = SummaryBuilder::new().build(&apps, NO_CLUSTERS);

        assert_eq!(summary.totals.applications, 3);
        assert_eq!(summary.totals.production_applications, 1);
        assert_eq!(summary.totals.nonproduction_applications, 1);
        assert_eq!(summary.totals.lab_applications, 1);
        assert_eq!(summary.totals.active_applications, 1);
        assert_eq!(summary.totals.inactive_applications, 2);
        assert_eq!(summary.migration.ready_for_migration, 2);
        assert_eq!(summary.migration.needs_planning, 1);
    }

    #[test]
    fn test_prod_alias_is_not_counted_as_production() {
        let apps = vec![
            app("a", false, &["prod"], &["dc01"], 50),
            app("b", false, &["production"], &["dc01"], 50),
        ];
        let summary = SummaryBuilder::new().build(&apps, NO_CLUSTERS);
        assert_eq!(summary.totals.production_applications, 1);
        assert_eq!(summary.totals.nonproduction_applications, 0);
    }

    #[test]
    fn test_pod_total_comes_from_clusters() {
        let clusters = vec![cluster("c1", 10), cluster("c2", 7)];
        let summary = SummaryBuilder::new().build(NO_APPS, &clusters);
        assert_eq!(summary.totals.clusters, 2);
        assert_eq!(summary.totals.total_pods, 17);
    }

    #[test]
    fn test_by_foundation_includes_known_and_discovered() {
        let apps = vec![
            app("a", true, &["lab"], &["dc01", "dc02"], 50),
            app("b", false, &["lab"], &["dc02"], 50),
        ];
        let summary = SummaryBuilder::new()
            .with_known_foundations(vec!["dc04".to_string()])
            .build(&apps, NO_CLUSTERS);

        let keys: Vec<&str> = summary.by_foundation.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["dc01", "dc02", "dc04"]);
        assert_eq!(summary.by_foundation["dc02"].applications, 2);
        assert_eq!(summary.by_foundation["dc02"].active, 1);
        assert_eq!(summary.by_foundation["dc02"].inactive, 1);
        assert_eq!(summary.by_foundation["dc04"], FoundationBreakdown::default());
    }

    #[test]
    fn test_incomplete_needs_metadata_analysis() {
        let mut incomplete = app("a", false, &["lab"], &["dc01"], 50);
        incomplete.data_quality = DataQuality::Incomplete;
        let apps = vec![incomplete, app("b", false, &["lab"], &["dc01"], 50)];
        let summary = SummaryBuilder::new().build(&apps, NO_CLUSTERS);
        assert_eq!(summary.migration.needs_metadata_analysis, 1);
    }

    #[test]
    fn test_classify_environment() {
        assert_eq!(
            EnvironmentCategory::classify("Production"),
            Some(EnvironmentCategory::Production)
        );
        assert_eq!(EnvironmentCategory::classify("prod"), None);
        assert_eq!(
            EnvironmentCategory::classify("non-production"),
            Some(EnvironmentCategory::NonProduction)
        );
        assert_eq!(EnvironmentCategory::classify("staging"), None);
    }
}
