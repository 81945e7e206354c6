//! Consolidation scenarios across several foundations

#[cfg(test)]
mod consolidation_tests {
    use crate::consolidate::{
        consolidate, ConsolidationMetadata, FoundationReports, ReportKind, ReportSource, Table,
    };
    use crate::error::TrackerError;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn applications(rows: &[[&str; 5]]) -> Table {
        let mut table = Table::new([
            "Application ID",
            "Status",
            "Environment",
            "Total Pods",
            "Migration Readiness Score",
        ]);
        for row in rows {
            table.push_row(row.iter().copied());
        }
        table
    }

    fn clusters(names: &[&str]) -> Table {
        let mut table = Table::new(["Cluster", "Total Pods"]);
        for name in names {
            table.push_row([*name, "10"]);
        }
        table
    }

    fn migration(rows: &[(&str, &str)]) -> Table {
        let mut table = Table::new(["Priority", "Application ID", "Migration Score"]);
        for (i, (app, score)) in rows.iter().enumerate() {
            table.push_row([(i + 1).to_string(), app.to_string(), score.to_string()]);
        }
        table
    }

    fn loaded(table: Table, origin: &str) -> ReportSource {
        ReportSource::loaded(table, origin)
    }

    fn two_foundations() -> BTreeMap<String, FoundationReports> {
        let dc01 = FoundationReports::new()
            .with(
                ReportKind::Applications,
                loaded(
                    applications(&[
                        ["orders", "Active", "Production", "12", "20"],
                        ["billing", "Inactive", "Nonprod", "3", "90"],
                    ]),
                    "reports/dc01/application_report_1.csv",
                ),
            )
            .with(
                ReportKind::Clusters,
                loaded(clusters(&["dc01-b", "dc01-a"]), "reports/dc01/cluster_report_1.csv"),
            )
            .with(
                ReportKind::MigrationPriority,
                loaded(
                    migration(&[("billing", "90"), ("orders", "20")]),
                    "reports/dc01/migration_priority_1.csv",
                ),
            );

        let dc02 = FoundationReports::new()
            .with(
                ReportKind::Applications,
                loaded(
                    applications(&[["billing", "Active", "Lab", "4", "90"]]),
                    "reports/dc02/application_report_1.csv",
                ),
            )
            .with(
                ReportKind::MigrationPriority,
                loaded(migration(&[("billing", "90")]), "reports/dc02/migration_priority_1.csv"),
            );

        BTreeMap::from([("dc02".to_string(), dc02), ("dc01".to_string(), dc01)])
    }

    #[test]
    fn test_rows_are_kept_per_foundation() {
        let dataset = consolidate(&two_foundations()).unwrap();

        let apps = &dataset.applications;
        assert_eq!(apps.len(), 3);
        let keys: Vec<(&str, &str)> = apps
            .rows()
            .iter()
            .map(|r| {
                (
                    apps.cell(r, "foundation").unwrap(),
                    apps.cell(r, "application_id").unwrap(),
                )
            })
            .collect();
        assert_eq!(
            keys,
            vec![("dc01", "billing"), ("dc01", "orders"), ("dc02", "billing")]
        );
    }

    #[test]
    fn test_headers_are_normalized() {
        let dataset = consolidate(&two_foundations()).unwrap();
        assert_eq!(
            dataset.applications.headers(),
            [
                "application_id",
                "status",
                "environment",
                "total_pods",
                "migration_readiness_score",
                "foundation"
            ]
        );
    }

    #[test]
    fn test_inconsistent_headers_still_merge() {
        let mut shouting = Table::new([" APPLICATION ID", "Total  Pods", "Foundation"]);
        shouting.push_row(["zeta", "1", "dc09"]);
        let mut quiet = Table::new(["application_id", "total  pods"]);
        quiet.push_row(["alpha", "2"]);

        let inputs = BTreeMap::from([
            (
                "dc09".to_string(),
                FoundationReports::new().with(ReportKind::Applications, loaded(shouting, "a.csv")),
            ),
            (
                "dc10".to_string(),
                FoundationReports::new().with(ReportKind::Applications, loaded(quiet, "b.csv")),
            ),
        ]);

        let dataset = consolidate(&inputs).unwrap();
        assert_eq!(
            dataset.applications.headers(),
            ["application_id", "total__pods", "foundation"]
        );
        assert_eq!(dataset.applications.rows()[0], ["zeta", "1", "dc09"]);
        assert_eq!(dataset.applications.rows()[1], ["alpha", "2", "dc10"]);
    }

    #[test]
    fn test_clusters_sorted_and_missing_kind_tolerated() {
        let dataset = consolidate(&two_foundations()).unwrap();
        let clusters = &dataset.clusters;
        let names: Vec<&str> = clusters
            .rows()
            .iter()
            .map(|r| clusters.cell(r, "cluster").unwrap())
            .collect();
        assert_eq!(names, vec!["dc01-a", "dc01-b"]);
        assert!(dataset
            .warnings
            .iter()
            .any(|w| w.contains("dc02") && w.contains("clusters")));
    }

    #[test]
    fn test_migration_priority_sorted_by_score_then_foundation() {
        let dataset = consolidate(&two_foundations()).unwrap();
        let table = &dataset.migration_priority;
        let order: Vec<(&str, &str)> = table
            .rows()
            .iter()
            .map(|r| {
                (
                    table.cell(r, "migration_score").unwrap(),
                    table.cell(r, "foundation").unwrap(),
                )
            })
            .collect();
        assert_eq!(order, vec![("90", "dc01"), ("90", "dc02"), ("20", "dc01")]);
    }

    #[test]
    fn test_executive_summary_is_recomputed_with_total() {
        let dataset = consolidate(&two_foundations()).unwrap();
        let summary = &dataset.executive_summary;
        assert_eq!(summary.len(), 3);

        let dc01 = &summary.rows()[0];
        assert_eq!(summary.cell(dc01, "foundation"), Some("dc01"));
        assert_eq!(summary.cell(dc01, "total_applications"), Some("2"));
        assert_eq!(summary.cell(dc01, "active_applications"), Some("1"));
        assert_eq!(summary.cell(dc01, "production_applications"), Some("1"));
        assert_eq!(summary.cell(dc01, "migration_ready_apps"), Some("1"));
        assert_eq!(summary.cell(dc01, "total_clusters"), Some("2"));
        assert_eq!(summary.cell(dc01, "total_pods"), Some("15"));
        assert_eq!(
            summary.cell(dc01, "report_file"),
            Some("application_report_1.csv")
        );

        let total = &summary.rows()[2];
        assert_eq!(summary.cell(total, "foundation"), Some("TOTAL"));
        assert_eq!(summary.cell(total, "total_applications"), Some("3"));
        assert_eq!(summary.cell(total, "active_applications"), Some("2"));
        assert_eq!(summary.cell(total, "inactive_applications"), Some("1"));
        assert_eq!(summary.cell(total, "total_clusters"), Some("2"));
        assert_eq!(summary.cell(total, "total_pods"), Some("19"));
        assert_eq!(summary.cell(total, "report_file"), Some("Combined"));
    }

    #[test]
    fn test_single_foundation_round_trip() {
        let original = applications(&[
            ["orders", "Active", "Production", "12", "20"],
            ["billing", "Inactive", "Nonprod", "3", "90"],
        ]);
        let inputs = BTreeMap::from([(
            "dc01".to_string(),
            FoundationReports::new().with(ReportKind::Applications, loaded(original.clone(), "a.csv")),
        )]);

        let dataset = consolidate(&inputs).unwrap();
        let apps = &dataset.applications;
        assert_eq!(apps.len(), original.len());
        assert_eq!(
            apps.rows()[0],
            ["billing", "Inactive", "Nonprod", "3", "90", "dc01"]
        );
        assert_eq!(
            apps.rows()[1],
            ["orders", "Active", "Production", "12", "20", "dc01"]
        );
    }

    #[test]
    fn test_failed_foundation_is_skipped_for_that_kind_only() {
        let mut inputs = two_foundations();
        inputs.insert(
            "dc03".to_string(),
            FoundationReports::new()
                .with(
                    ReportKind::Applications,
                    ReportSource::Failed {
                        origin: "reports/dc03/application_report_1.csv".into(),
                        reason: "invalid UTF-8".into(),
                    },
                )
                .with(
                    ReportKind::Clusters,
                    loaded(clusters(&["dc03-a"]), "reports/dc03/cluster_report_1.csv"),
                ),
        );

        let dataset = consolidate(&inputs).unwrap();
        assert_eq!(dataset.applications.len(), 3);
        assert_eq!(dataset.clusters.len(), 3);
        assert!(!dataset.foundation_stats.contains_key("dc03"));
        assert!(dataset.warnings.iter().any(|w| w.contains("invalid UTF-8")));
    }

    #[test]
    fn test_no_application_data_is_fatal() {
        let inputs = BTreeMap::from([(
            "dc01".to_string(),
            FoundationReports::new().with(ReportKind::Clusters, loaded(clusters(&["c1"]), "c.csv")),
        )]);
        assert!(matches!(
            consolidate(&inputs),
            Err(TrackerError::MissingData(_))
        ));
        assert!(matches!(
            consolidate(&BTreeMap::new()),
            Err(TrackerError::MissingData(_))
        ));
    }

    #[test]
    fn test_absent_kind_yields_empty_table() {
        let inputs = BTreeMap::from([(
            "dc01".to_string(),
            FoundationReports::new().with(
                ReportKind::Applications,
                loaded(applications(&[["a", "Active", "Lab", "1", "50"]]), "a.csv"),
            ),
        )]);
        let dataset = consolidate(&inputs).unwrap();
        assert!(dataset.clusters.is_empty());
        assert!(dataset.migration_priority.is_empty());
        assert_eq!(dataset.executive_summary.len(), 2);
    }

    #[test]
    fn test_consolidation_is_repeatable() {
        let inputs = two_foundations();
        assert_eq!(consolidate(&inputs).unwrap(), consolidate(&inputs).unwrap());
    }

    #[test]
    fn test_metadata_counts() {
        let dataset = consolidate(&two_foundations()).unwrap();
        let metadata = ConsolidationMetadata::new(&dataset, Utc::now());
        assert_eq!(metadata.total_foundations, 2);
        assert_eq!(metadata.total_applications, 3);
        assert_eq!(metadata.total_active_applications, 2);
        assert_eq!(metadata.row_counts[&ReportKind::ExecutiveSummary], 3);
    }
}
