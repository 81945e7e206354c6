//! Error types for aggregation and consolidation runs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Error, Debug)]
pub enum TrackerError {
    /// No usable input at all; the run cannot produce anything
    #[error("Missing data: {0}")]
    MissingData(String),

    /// One source (record, file or foundation) could not be used.
    /// Callers recover from this by skipping the source and keeping a warning.
    #[error("Skipped source {source_name}: {reason}")]
    PartialSource { source_name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl TrackerError {
    pub fn partial(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::PartialSource {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the run can continue past this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PartialSource { .. })
    }
}
