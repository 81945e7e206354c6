//! Configuration management for the CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackerConfig {
    /// Directory holding raw `all_clusters_*.json` snapshots
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory reports are written to
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Foundations always listed in summaries, even without data
    #[serde(default)]
    pub known_foundations: Vec<String>,

    /// File name prefix of raw snapshots
    #[serde(default = "default_raw_file_prefix")]
    pub raw_file_prefix: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_raw_file_prefix() -> String {
    tracker_lib::loader::DEFAULT_FILE_PREFIX.to_string()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            reports_dir: default_reports_dir(),
            known_foundations: Vec::new(),
            raw_file_prefix: default_raw_file_prefix(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from an optional file overlaid by `TRACKER_*`
    /// environment variables. A missing default file is not an error; a
    /// missing explicit one is.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match explicit {
            Some(path) => {
                builder = builder.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                if let Some(path) = Self::default_path() {
                    builder = builder.add_source(config::File::from(path).required(false));
                }
            }
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("TRACKER")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("known_foundations"),
            )
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// `~/.config/tkgi-tracker/config.json`
    fn default_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("tkgi-tracker").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracker.json");
        std::fs::write(
            &path,
            r#"{"reports_dir": "/srv/reports", "known_foundations": ["dc01", "dc02"]}"#,
        )
        .unwrap();

        let config = TrackerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.reports_dir, PathBuf::from("/srv/reports"));
        assert_eq!(config.known_foundations, vec!["dc01", "dc02"]);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.raw_file_prefix, "all_clusters_");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(TrackerConfig::load(Some(&dir.path().join("absent.json"))).is_err());
    }
}
