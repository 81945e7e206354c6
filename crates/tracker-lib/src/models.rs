//! Core data models for the application tracker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel used wherever an identifier could not be determined
pub const UNKNOWN: &str = "unknown";

/// Raw inventory snapshot of a single namespace within one cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceRecord {
    pub namespace: String,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub cluster_full: Option<String>,
    #[serde(default = "unknown_string")]
    pub foundation: String,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub pod_count: u64,
    #[serde(default)]
    pub running_pods: u64,
    #[serde(default)]
    pub deployment_count: u64,
    #[serde(default)]
    pub service_count: u64,
    #[serde(default)]
    pub labels: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    pub last_activity: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
}

fn unknown_string() -> String {
    UNKNOWN.to_string()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl NamespaceRecord {
    /// Cluster key: fully-qualified id, then short name, then the sentinel
    pub fn cluster_id(&self) -> &str {
        non_empty(&self.cluster_full)
            .or_else(|| non_empty(&self.cluster))
            .unwrap_or(UNKNOWN)
    }

    pub fn environment(&self) -> &str {
        non_empty(&self.environment).unwrap_or(UNKNOWN)
    }

    /// Explicit application id, ignoring the `unknown` sentinel
    pub fn explicit_app_id(&self) -> Option<&str> {
        non_empty(&self.app_id).filter(|id| *id != UNKNOWN)
    }

    /// Activity timestamp, ignoring blanks and the `unknown` sentinel
    pub fn activity(&self) -> Option<&str> {
        non_empty(&self.last_activity).filter(|ts| *ts != UNKNOWN)
    }

    pub fn has_labels(&self) -> bool {
        self.labels.as_ref().is_some_and(|labels| !labels.is_empty())
    }
}

/// Trustworthiness of an application's source metadata.
///
/// Variants are ordered from best to worst; combining two qualities always
/// keeps the worse one, so quality can only go down.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    #[default]
    Complete,
    Partial,
    Incomplete,
}

impl DataQuality {
    pub fn downgrade(self, observed: DataQuality) -> DataQuality {
        self.max(observed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataQuality::Complete => "complete",
            DataQuality::Partial => "partial",
            DataQuality::Incomplete => "incomplete",
        }
    }
}

/// Finalized rollup of every namespace belonging to one application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub app_id: String,
    pub is_active: bool,
    pub last_activity: Option<String>,
    pub days_since_activity: Option<i64>,
    pub foundations: Vec<String>,
    pub clusters: Vec<String>,
    pub namespaces: Vec<String>,
    pub environments: Vec<String>,
    pub total_pods: u64,
    pub running_pods: u64,
    pub total_deployments: u64,
    pub total_services: u64,
    pub data_quality: DataQuality,
    pub migration_readiness: u8,
}

impl ApplicationRecord {
    pub fn has_environment(&self, environment: &str) -> bool {
        self.environments.iter().any(|e| e == environment)
    }

    pub fn in_foundation(&self, foundation: &str) -> bool {
        self.foundations.iter().any(|f| f == foundation)
    }
}

/// Finalized rollup of every namespace hosted on one cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub cluster: String,
    pub foundation: String,
    pub environment: String,
    pub total_namespaces: u64,
    pub app_namespaces: u64,
    pub system_namespaces: u64,
    pub applications: Vec<String>,
    pub application_count: usize,
    pub total_pods: u64,
    pub running_pods: u64,
}

/// Executive rollup of one aggregation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub timestamp: DateTime<Utc>,
    pub totals: SummaryTotals,
    pub migration: MigrationSummary,
    pub by_foundation: BTreeMap<String, FoundationBreakdown>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub applications: usize,
    pub active_applications: usize,
    pub inactive_applications: usize,
    pub production_applications: usize,
    pub nonproduction_applications: usize,
    pub lab_applications: usize,
    pub clusters: usize,
    pub total_pods: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationSummary {
    pub ready_for_migration: usize,
    pub needs_planning: usize,
    pub needs_metadata_analysis: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoundationBreakdown {
    pub applications: usize,
    pub active: usize,
    pub inactive: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_defaults_from_sparse_json() {
        let record: NamespaceRecord =
            serde_json::from_str(r#"{"namespace": "billing-api"}"#).unwrap();
        assert_eq!(record.foundation, "unknown");
        assert_eq!(record.cluster_id(), "unknown");
        assert_eq!(record.environment(), "unknown");
        assert!(!record.is_system);
        assert!(!record.has_labels());
        assert!(record.explicit_app_id().is_none());
    }

    #[test]
    fn test_cluster_id_prefers_full_name() {
        let record = NamespaceRecord {
            cluster: Some("k8s-n-01".into()),
            cluster_full: Some("dc01-k8s-n-01".into()),
            ..Default::default()
        };
        assert_eq!(record.cluster_id(), "dc01-k8s-n-01");

        let record = NamespaceRecord {
            cluster: Some("k8s-n-01".into()),
            cluster_full: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(record.cluster_id(), "k8s-n-01");
    }

    #[test]
    fn test_unknown_sentinels_are_ignored() {
        let record = NamespaceRecord {
            app_id: Some("unknown".into()),
            last_activity: Some("unknown".into()),
            ..Default::default()
        };
        assert!(record.explicit_app_id().is_none());
        assert!(record.activity().is_none());
    }

    #[test]
    fn test_empty_labels_count_as_missing() {
        let record = NamespaceRecord {
            labels: Some(BTreeMap::new()),
            ..Default::default()
        };
        assert!(!record.has_labels());
    }

    #[test]
    fn test_data_quality_only_downgrades() {
        let quality = DataQuality::Complete.downgrade(DataQuality::Incomplete);
        assert_eq!(quality, DataQuality::Incomplete);
        assert_eq!(quality.downgrade(DataQuality::Complete), DataQuality::Incomplete);
        assert_eq!(
            DataQuality::Partial.downgrade(DataQuality::Complete),
            DataQuality::Partial
        );
    }

    #[test]
    fn test_data_quality_serializes_lowercase() {
        let json = serde_json::to_string(&DataQuality::Incomplete).unwrap();
        assert_eq!(json, "\"incomplete\"");
    }
}
