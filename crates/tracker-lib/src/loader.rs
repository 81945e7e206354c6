//! Loading raw namespace inventory snapshots from JSON files
//!
//! A snapshot file holds either an array of namespace records or a single
//! record. Each element is deserialized on its own so one malformed entry
//! never costs the rest of the file.

use crate::error::{Result, TrackerError};
use crate::models::NamespaceRecord;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

pub const DEFAULT_FILE_PREFIX: &str = "all_clusters_";

/// Records read from one or more snapshot files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedRecords {
    pub records: Vec<NamespaceRecord>,
    pub sources: Vec<PathBuf>,
    /// One entry per skipped element or unreadable file
    pub warnings: Vec<String>,
}

impl LoadedRecords {
    pub fn skipped(&self) -> usize {
        self.warnings.len()
    }
}

/// Parse one snapshot document. Only a document that is not JSON at all is an
/// error; bad elements come back as warnings.
pub fn parse_records(text: &str, source: &str) -> Result<(Vec<NamespaceRecord>, Vec<String>)> {
    let elements = match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => items,
        single @ Value::Object(_) => vec![single],
        other => {
            return Err(TrackerError::partial(
                source,
                format!("expected an array or object, found {}", json_type(&other)),
            ))
        }
    };

    let mut records = Vec::with_capacity(elements.len());
    let mut warnings = Vec::new();
    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<NamespaceRecord>(element) {
            Ok(record) => records.push(record),
            Err(e) => {
                let err = TrackerError::partial(format!("{source}[{index}]"), e);
                debug!(error = %err, "Skipping malformed record");
                warnings.push(err.to_string());
            }
        }
    }
    Ok((records, warnings))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Most recently modified `<prefix>*.json` file in `dir`
pub fn latest_data_file(dir: &Path, prefix: &str) -> Result<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|e| {
        TrackerError::MissingData(format!(
            "no cluster data files found ({}: {e})",
            dir.display()
        ))
    })?;

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for path in entries.flatten().map(|e| e.path()) {
        let matches = path.file_name().and_then(|n| n.to_str()).is_some_and(|name| {
            name.starts_with(prefix) && name.to_ascii_lowercase().ends_with(".json")
        });
        if !matches || !path.is_file() {
            continue;
        }
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if latest.as_ref().map_or(true, |(current, _)| modified >= *current) {
            latest = Some((modified, path));
        }
    }

    latest.map(|(_, path)| path).ok_or_else(|| {
        TrackerError::MissingData(format!(
            "no cluster data files found matching {prefix}*.json in {}",
            dir.display()
        ))
    })
}

/// Load the newest snapshot in `dir`
pub fn load_latest(dir: &Path, prefix: &str) -> Result<LoadedRecords> {
    let path = latest_data_file(dir, prefix)?;
    info!(file = %path.display(), "Using latest cluster data file");
    load_files(&[path])
}

/// Load and concatenate every given snapshot. Unreadable files are skipped
/// with a warning; the call fails only when none could be read.
pub fn load_files(paths: &[PathBuf]) -> Result<LoadedRecords> {
    if paths.is_empty() {
        return Err(TrackerError::MissingData(
            "no cluster data files found".to_string(),
        ));
    }

    let mut loaded = LoadedRecords::default();
    for path in paths {
        let source = path.display().to_string();
        let parsed = fs::read_to_string(path)
            .map_err(TrackerError::from)
            .and_then(|text| parse_records(&text, &source));

        match parsed {
            Ok((records, warnings)) => {
                info!(
                    file = %source,
                    records = records.len(),
                    skipped = warnings.len(),
                    "Loaded cluster data"
                );
                loaded.records.extend(records);
                loaded.warnings.extend(warnings);
                loaded.sources.push(path.clone());
            }
            Err(e) => {
                warn!(file = %source, error = %e, "Skipping unreadable cluster data file");
                loaded
                    .warnings
                    .push(TrackerError::partial(source, e).to_string());
            }
        }
    }

    if loaded.sources.is_empty() {
        return Err(TrackerError::MissingData(
            "no cluster data files could be read".to_string(),
        ));
    }
    if loaded.records.is_empty() {
        warn!(
            files = loaded.sources.len(),
            skipped = loaded.skipped(),
            "Cluster data files held no usable namespace records"
        );
        return Err(TrackerError::MissingData(
            "no usable namespace records found".to_string(),
        ));
    }
    Ok(loaded)
}
