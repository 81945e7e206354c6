//! Discovery of per-foundation report files on disk
//!
//! Layout: one subdirectory per foundation under a common root, each holding
//! the CSV reports that foundation's run produced. When a foundation holds
//! several files of one kind the most recently modified wins.

use super::{FoundationReports, ReportKind, ReportSource, Table};
use crate::error::{Result, TrackerError};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Subdirectories of the reports root that never hold a foundation
pub const SKIPPED_DIRECTORIES: &[&str] = &["consolidated", "data"];

/// Find and load every foundation's reports below `root`.
///
/// Only an unreadable `root` is an error. Unreadable or malformed report
/// files are recorded as [`ReportSource::Failed`] for their kind.
pub fn discover_foundation_reports(root: &Path) -> Result<BTreeMap<String, FoundationReports>> {
    let mut discovered = BTreeMap::new();

    let entries = fs::read_dir(root).map_err(|e| {
        TrackerError::MissingData(format!(
            "no foundation reports found ({}: {e})",
            root.display()
        ))
    })?;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let foundation = entry.file_name().to_string_lossy().into_owned();
        if SKIPPED_DIRECTORIES.contains(&foundation.as_str()) {
            debug!(directory = %foundation, "Skipping non-foundation directory");
            continue;
        }

        info!(foundation = %foundation, "Discovering reports");
        let reports = load_foundation(&path);
        info!(
            foundation = %foundation,
            found = reports.len(),
            expected = ReportKind::ALL.len(),
            "Report discovery complete"
        );

        if reports.is_empty() {
            warn!(foundation = %foundation, "No CSV reports found");
            continue;
        }
        discovered.insert(foundation, reports);
    }

    Ok(discovered)
}

fn load_foundation(dir: &Path) -> FoundationReports {
    let mut latest: BTreeMap<ReportKind, (SystemTime, PathBuf)> = BTreeMap::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(directory = %dir.display(), error = %e, "Cannot list foundation directory");
            return FoundationReports::new();
        }
    };

    for path in entries.flatten().map(|e| e.path()) {
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            continue;
        }
        let Some(kind) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(ReportKind::from_file_name)
        else {
            continue;
        };

        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let newer = latest
            .get(&kind)
            .map_or(true, |(current, _)| modified >= *current);
        if newer {
            latest.insert(kind, (modified, path));
        }
    }

    let mut reports = FoundationReports::new();
    for (kind, (_, path)) in latest {
        reports.insert(kind, load_report(&path));
    }
    reports
}

/// Load one CSV report, turning any failure into a [`ReportSource::Failed`]
pub fn load_report(path: &Path) -> ReportSource {
    let origin = path.display().to_string();
    let loaded = File::open(path)
        .map_err(TrackerError::from)
        .and_then(Table::read_csv);

    match loaded {
        Ok(table) => ReportSource::loaded(table, origin),
        Err(e) => ReportSource::Failed {
            origin,
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_discovers_foundations_and_kinds() {
        let root = TempDir::new().unwrap();
        let dc01 = root.path().join("dc01");
        write(&dc01, "application_report_20240101_000000.csv", "Application ID\nbilling\n");
        write(&dc01, "cluster_report_20240101_000000.csv", "Cluster\nc1\n");
        write(&dc01, "notes.txt", "ignored");
        write(&root.path().join("consolidated"), "application_report_x.csv", "a\n1\n");
        write(&root.path().join("empty"), "readme.md", "nothing here");

        let found = discover_foundation_reports(root.path()).unwrap();
        assert_eq!(found.keys().collect::<Vec<_>>(), vec!["dc01"]);

        let reports = &found["dc01"];
        assert_eq!(reports.len(), 2);
        assert!(matches!(
            reports.get(ReportKind::Applications),
            Some(ReportSource::Loaded { .. })
        ));
        assert!(reports.get(ReportKind::MigrationPriority).is_none());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let root = TempDir::new().unwrap();
        match discover_foundation_reports(&root.path().join("absent")) {
            Err(TrackerError::MissingData(msg)) => {
                assert!(msg.starts_with("no foundation reports found"))
            }
            other => panic!("expected MissingData, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_file_becomes_failed_source() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("application_report.csv");
        fs::write(&path, b"Application ID\n\xff\xfe\n").unwrap();

        assert!(matches!(load_report(&path), ReportSource::Failed { .. }));
    }
}
