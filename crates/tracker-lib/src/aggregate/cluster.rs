//! Per-cluster accumulation

use crate::identity::{self, is_unknown};
use crate::models::{ClusterRecord, NamespaceRecord, UNKNOWN};
use std::collections::{BTreeMap, BTreeSet};

/// Mutable rollup of one cluster while the raw stream is being read
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAccumulator {
    cluster: String,
    foundation: String,
    environment: String,
    total_namespaces: u64,
    app_namespaces: u64,
    system_namespaces: u64,
    applications: BTreeSet<String>,
    total_pods: u64,
    running_pods: u64,
}

impl ClusterAccumulator {
    pub fn new(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            foundation: UNKNOWN.to_string(),
            environment: UNKNOWN.to_string(),
            total_namespaces: 0,
            app_namespaces: 0,
            system_namespaces: 0,
            applications: BTreeSet::new(),
            total_pods: 0,
            running_pods: 0,
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Fold one record. Both system and application namespaces count
    /// towards the cluster's pod load.
    pub fn fold(&mut self, record: &NamespaceRecord) {
        // Placement comes from the most recent record seen
        self.foundation = record.foundation.clone();
        self.environment = record.environment().to_string();
        self.total_namespaces += 1;

        if record.is_system {
            self.system_namespaces += 1;
        } else {
            self.app_namespaces += 1;
            let app_id = identity::resolve(record);
            if !is_unknown(&app_id) {
                self.applications.insert(app_id);
            }
        }

        self.total_pods += record.pod_count;
        self.running_pods += record.running_pods;
    }

    pub fn finalize(&self) -> ClusterRecord {
        ClusterRecord {
            cluster: self.cluster.clone(),
            foundation: self.foundation.clone(),
            environment: self.environment.clone(),
            total_namespaces: self.total_namespaces,
            app_namespaces: self.app_namespaces,
            system_namespaces: self.system_namespaces,
            applications: self.applications.iter().cloned().collect(),
            application_count: self.applications.len(),
            total_pods: self.total_pods,
            running_pods: self.running_pods,
        }
    }
}

/// Fold a record into the accumulator map keyed by cluster id
pub fn fold_cluster(accumulators: &mut BTreeMap<String, ClusterAccumulator>, record: &NamespaceRecord) {
    let cluster_id = record.cluster_id();
    accumulators
        .entry(cluster_id.to_string())
        .or_insert_with(|| ClusterAccumulator::new(cluster_id))
        .fold(record);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(namespace: &str, is_system: bool, pods: u64) -> NamespaceRecord {
        NamespaceRecord {
            namespace: namespace.into(),
            cluster: Some("k8s-n-01".into()),
            cluster_full: Some("dc01-k8s-n-01".into()),
            foundation: "dc01".into(),
            is_system,
            pod_count: pods,
            running_pods: pods,
            environment: Some("lab".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_counts_system_and_app_namespaces() {
        let mut map = BTreeMap::new();
        fold_cluster(&mut map, &record("kube-system", true, 10));
        fold_cluster(&mut map, &record("billing-api", false, 4));
        fold_cluster(&mut map, &record("billing-worker", false, 2));

        let cluster = map["dc01-k8s-n-01"].finalize();
        assert_eq!(cluster.total_namespaces, 3);
        assert_eq!(cluster.system_namespaces, 1);
        assert_eq!(cluster.app_namespaces, 2);
        assert_eq!(cluster.total_pods, 16);
        assert_eq!(cluster.running_pods, 16);
        assert_eq!(cluster.applications, vec!["billing".to_string()]);
        assert_eq!(cluster.application_count, 1);
        assert_eq!(cluster.foundation, "dc01");
        assert_eq!(cluster.environment, "lab");
    }

    #[test]
    fn test_unresolvable_apps_are_not_listed() {
        let mut acc = ClusterAccumulator::new("dc01-k8s-n-01");
        acc.fold(&record("standalone", false, 1));
        let cluster = acc.finalize();
        assert_eq!(cluster.app_namespaces, 1);
        assert_eq!(cluster.application_count, 0);
    }

    #[test]
    fn test_falls_back_to_short_name_then_unknown() {
        let mut map = BTreeMap::new();
        let mut short = record("billing-api", false, 1);
        short.cluster_full = None;
        fold_cluster(&mut map, &short);

        let mut nameless = record("billing-api", false, 1);
        nameless.cluster_full = None;
        nameless.cluster = None;
        fold_cluster(&mut map, &nameless);

        assert!(map.contains_key("k8s-n-01"));
        assert!(map.contains_key("unknown"));
    }
}
