//! Per-application accumulation
//!
//! An accumulator is created on the first record carrying its id and then
//! only ever grows: names are appended, sets are unioned, counters summed.

use crate::identity::{self, is_unknown};
use crate::models::{ApplicationRecord, DataQuality, NamespaceRecord, UNKNOWN};
use crate::scoring;
use crate::timestamp::ActivityTimestamp;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Applications idle for longer than this many days are inactive
pub const ACTIVE_WINDOW_DAYS: i64 = 30;

/// Mutable rollup of one application while the raw stream is being read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationAccumulator {
    app_id: String,
    namespaces: Vec<String>,
    foundations: BTreeSet<String>,
    environments: BTreeSet<String>,
    clusters: BTreeSet<String>,
    total_pods: u64,
    running_pods: u64,
    total_deployments: u64,
    total_services: u64,
    last_activity: Option<String>,
    data_quality: DataQuality,
}

impl ApplicationAccumulator {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            ..Default::default()
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn last_activity(&self) -> Option<&str> {
        self.last_activity.as_deref()
    }

    pub fn data_quality(&self) -> DataQuality {
        self.data_quality
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Fold one record into the rollup. System namespaces are ignored.
    pub fn fold(&mut self, record: &NamespaceRecord) {
        if record.is_system {
            return;
        }

        self.namespaces.push(record.namespace.clone());
        self.foundations.insert(record.foundation.clone());
        self.environments.insert(record.environment().to_string());
        self.clusters.insert(record.cluster_id().to_string());

        self.total_pods += record.pod_count;
        self.running_pods += record.running_pods;
        self.total_deployments += record.deployment_count;
        self.total_services += record.service_count;

        // ISO-8601 strings of the same shape order lexically by time.
        // Parseable values always outrank malformed ones.
        if let Some(activity) = record.activity() {
            let newer = self
                .last_activity
                .as_deref()
                .map_or(true, |current| activity_rank(activity) > activity_rank(current));
            if newer {
                self.last_activity = Some(activity.to_string());
            }
        }

        self.data_quality = self
            .data_quality
            .downgrade(assess_quality(record, &self.app_id));
    }

    /// Whether the application counts as active at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.days_since_activity(now)
            .is_some_and(|days| days <= ACTIVE_WINDOW_DAYS)
    }

    fn days_since_activity(&self, now: DateTime<Utc>) -> Option<i64> {
        ActivityTimestamp::parse(self.last_activity.as_deref()).days_until(now)
    }

    /// Produce the frozen record. Depends only on the accumulated state and
    /// `now`, so calling it repeatedly yields the same record.
    pub fn finalize(&self, now: DateTime<Utc>) -> ApplicationRecord {
        let days_since_activity = self.days_since_activity(now);

        let mut record = ApplicationRecord {
            app_id: self.app_id.clone(),
            is_active: days_since_activity.is_some_and(|days| days <= ACTIVE_WINDOW_DAYS),
            last_activity: self.last_activity.clone(),
            days_since_activity,
            foundations: self.foundations.iter().cloned().collect(),
            clusters: self.clusters.iter().cloned().collect(),
            namespaces: self.namespaces.clone(),
            environments: self.environments.iter().cloned().collect(),
            total_pods: self.total_pods,
            running_pods: self.running_pods,
            total_deployments: self.total_deployments,
            total_services: self.total_services,
            data_quality: self.data_quality,
            migration_readiness: 0,
        };
        record.migration_readiness = scoring::score(&record);
        record
    }
}

fn activity_rank(raw: &str) -> (bool, &str) {
    let valid = matches!(ActivityTimestamp::parse(Some(raw)), ActivityTimestamp::Valid(_));
    (valid, raw)
}

/// Quality evidence carried by a single record
fn assess_quality(record: &NamespaceRecord, app_id: &str) -> DataQuality {
    if is_unknown(app_id) || !record.has_labels() {
        DataQuality::Incomplete
    } else if record.environment() == UNKNOWN {
        DataQuality::Partial
    } else {
        DataQuality::Complete
    }
}

/// Fold a record into the accumulator map, creating the entry on first sight.
/// Returns the resolved id, or `None` for skipped system namespaces.
pub fn fold_application(
    accumulators: &mut BTreeMap<String, ApplicationAccumulator>,
    record: &NamespaceRecord,
) -> Option<String> {
    if record.is_system {
        return None;
    }

    let app_id = identity::resolve(record);
    accumulators
        .entry(app_id.clone())
        .or_insert_with(|| ApplicationAccumulator::new(app_id.clone()))
        .fold(record);
    Some(app_id)
}
