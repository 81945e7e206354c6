//! Library for tracking applications across TKGI foundations
//!
//! This crate provides the core functionality for:
//! - Resolving application identity from namespace inventory records
//! - Aggregating namespaces into application and cluster rollups
//! - Migration readiness scoring and executive summaries
//! - Rendering per-foundation report tables
//! - Consolidating report tables across foundations
//! - Observability

pub mod aggregate;
pub mod consolidate;
pub mod error;
pub mod identity;
pub mod loader;
pub mod models;
pub mod observability;
pub mod report;
pub mod scoring;
pub mod summary;
pub mod timestamp;

pub use aggregate::{Aggregation, Aggregator};
pub use consolidate::{consolidate, ConsolidatedDataset, ConsolidationMetadata, ReportKind, Table};
pub use error::{Result, TrackerError};
pub use models::*;
pub use observability::{StructuredLogger, TrackerMetrics};
pub use report::ReportSet;
pub use summary::SummaryBuilder;
