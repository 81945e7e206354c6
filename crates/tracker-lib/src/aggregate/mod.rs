//! Aggregation of raw namespace records
//!
//! One pass over the raw stream feeds two accumulator maps (by application
//! and by cluster), followed by one finalization pass. The maps belong to the
//! run and are dropped once the finalized records are produced.

mod application;
mod cluster;


pub use application::{fold_application, ApplicationAccumulator, ACTIVE_WINDOW_DAYS};
pub use cluster::{fold_cluster, ClusterAccumulator};

use crate::models::{ApplicationRecord, ClusterRecord, NamespaceRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Finalized output of one aggregation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub applications: BTreeMap<String, ApplicationRecord>,
    pub clusters: BTreeMap<String, ClusterRecord>,
    pub records_processed: usize,
    pub system_namespaces: usize,
    /// Pods in system namespaces; they load clusters but belong to no application
    pub system_pods: u64,
}

impl Aggregation {
    pub fn application_list(&self) -> Vec<&ApplicationRecord> {
        self.applications.values().collect()
    }

    pub fn cluster_list(&self) -> Vec<&ClusterRecord> {
        self.clusters.values().collect()
    }
}

/// Runs aggregation against a fixed reference time
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    now: DateTime<Utc>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    /// Aggregator measuring activity against the current time
    pub fn new() -> Self {
        Self { now: Utc::now() }
    }

    /// Aggregator measuring activity against a given time
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn run(&self, records: &[NamespaceRecord]) -> Aggregation {
        let mut applications: BTreeMap<String, ApplicationAccumulator> = BTreeMap::new();
        let mut clusters: BTreeMap<String, ClusterAccumulator> = BTreeMap::new();
        let mut system_namespaces = 0;
        let mut system_pods = 0;

        for record in records {
            fold_cluster(&mut clusters, record);

            match fold_application(&mut applications, record) {
                Some(app_id) => debug!(
                    namespace = %record.namespace,
                    app_id = %app_id,
                    "Namespace attributed to application"
                ),
                None => {
                    system_namespaces += 1;
                    system_pods += record.pod_count;
                }
            }
        }

        let applications: BTreeMap<String, ApplicationRecord> = applications
            .into_iter()
            .map(|(id, acc)| (id, acc.finalize(self.now)))
            .collect();
        let clusters: BTreeMap<String, ClusterRecord> = clusters
            .into_iter()
            .map(|(id, acc)| (id, acc.finalize()))
            .collect();

        info!(
            records = records.len(),
            applications = applications.len(),
            clusters = clusters.len(),
            system_namespaces = system_namespaces,
            "Aggregation complete"
        );

        Aggregation {
            applications,
            clusters,
            records_processed: records.len(),
            system_namespaces,
            system_pods,
        }
    }
}
