//! Observability infrastructure for tracker runs
//!
//! Provides:
//! - Prometheus metrics (records processed and skipped, aggregation latency, foundations consolidated)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_counter, Encoder, Histogram, IntCounter, TextEncoder,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for aggregation latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<TrackerMetricsInner> = OnceLock::new();

struct TrackerMetricsInner {
    aggregation_latency_seconds: Histogram,
    records_processed: IntCounter,
    records_skipped: IntCounter,
    applications_aggregated: IntCounter,
    clusters_aggregated: IntCounter,
    foundations_consolidated: IntCounter,
    foundation_load_failures: IntCounter,
}

impl TrackerMetricsInner {
    fn new() -> Self {
        Self {
            aggregation_latency_seconds: register_histogram!(
                "tkgi_tracker_aggregation_latency_seconds",
                "Time spent aggregating one batch of namespace records",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register aggregation_latency_seconds"),

            records_processed: register_int_counter!(
                "tkgi_tracker_records_processed_total",
                "Namespace records folded into the aggregation"
            )
            .expect("Failed to register records_processed"),

            records_skipped: register_int_counter!(
                "tkgi_tracker_records_skipped_total",
                "Raw records dropped because they could not be parsed"
            )
            .expect("Failed to register records_skipped"),

            applications_aggregated: register_int_counter!(
                "tkgi_tracker_applications_aggregated_total",
                "Application records produced by aggregation"
            )
            .expect("Failed to register applications_aggregated"),

            clusters_aggregated: register_int_counter!(
                "tkgi_tracker_clusters_aggregated_total",
                "Cluster records produced by aggregation"
            )
            .expect("Failed to register clusters_aggregated"),

            foundations_consolidated: register_int_counter!(
                "tkgi_tracker_foundations_consolidated_total",
                "Foundations whose application reports were merged"
            )
            .expect("Failed to register foundations_consolidated"),

            foundation_load_failures: register_int_counter!(
                "tkgi_tracker_foundation_load_failures_total",
                "Per-foundation report files that could not be loaded"
            )
            .expect("Failed to register foundation_load_failures"),
        }
    }
}

/// Tracker metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share it.
#[derive(Clone)]
pub struct TrackerMetrics {
    _private: (),
}

impl Default for TrackerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(TrackerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &TrackerMetricsInner {
        GLOBAL_METRICS.get_or_init(TrackerMetricsInner::new)
    }

    pub fn observe_aggregation_latency(&self, duration_secs: f64) {
        self.inner().aggregation_latency_seconds.observe(duration_secs);
    }

    pub fn add_records_processed(&self, count: u64) {
        self.inner().records_processed.inc_by(count);
    }

    pub fn add_records_skipped(&self, count: u64) {
        self.inner().records_skipped.inc_by(count);
    }

    /// Record the size of one finished aggregation
    pub fn record_aggregation(&self, applications: usize, clusters: usize) {
        self.inner().applications_aggregated.inc_by(applications as u64);
        self.inner().clusters_aggregated.inc_by(clusters as u64);
    }

    pub fn add_foundations_consolidated(&self, count: usize) {
        self.inner().foundations_consolidated.inc_by(count as u64);
    }

    pub fn inc_foundation_load_failures(&self) {
        self.inner().foundation_load_failures.inc();
    }

    /// Render every registered metric in the Prometheus text format
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Structured logger for tracker events
///
/// Emits one event per significant step of a run so JSON log consumers
/// can follow aggregation and consolidation without parsing messages.
#[derive(Clone)]
pub struct StructuredLogger {
    run_label: String,
}

impl StructuredLogger {
    pub fn new(run_label: impl Into<String>) -> Self {
        Self {
            run_label: run_label.into(),
        }
    }

    /// Log an input record that was dropped
    pub fn log_record_skipped(&self, source: &str, reason: &str) {
        warn!(
            event = "record_skipped",
            run = %self.run_label,
            source = %source,
            reason = %reason,
            "Skipped unparseable record"
        );
    }

    /// Log the outcome of one aggregation pass
    pub fn log_aggregation_completed(
        &self,
        records_processed: usize,
        applications: usize,
        clusters: usize,
        system_namespaces: usize,
        duration_secs: f64,
    ) {
        info!(
            event = "aggregation_completed",
            run = %self.run_label,
            records_processed = records_processed,
            applications = applications,
            clusters = clusters,
            system_namespaces = system_namespaces,
            duration_secs = duration_secs,
            "Aggregation completed"
        );
    }

    /// Log a foundation that contributed nothing for one report kind
    pub fn log_foundation_skipped(&self, foundation: &str, kind: &str, reason: &str) {
        warn!(
            event = "foundation_skipped",
            run = %self.run_label,
            foundation = %foundation,
            kind = %kind,
            reason = %reason,
            "Foundation skipped"
        );
    }

    /// Log the outcome of a consolidation run
    pub fn log_consolidation_completed(
        &self,
        foundations: usize,
        applications: usize,
        warnings: usize,
    ) {
        if warnings == 0 {
            info!(
                event = "consolidation_completed",
                run = %self.run_label,
                foundations = foundations,
                applications = applications,
                "Consolidation completed"
            );
        } else {
            warn!(
                event = "consolidation_completed",
                run = %self.run_label,
                foundations = foundations,
                applications = applications,
                warnings = warnings,
                "Consolidation completed with warnings"
            );
        }
    }
}
