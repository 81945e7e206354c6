//! Output formatting utilities

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Print a table from a list of items
pub fn print_table<T: Tabled>(items: &[T]) {
    if items.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(items).with(Style::rounded()).to_string();
    println!("{}", table);
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// `YYYYmmdd_HHMMSS` suffix shared by every file of one run
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}

/// `<dir>/<stem>_<timestamp>.<ext>`
pub fn output_path(dir: &Path, stem: &str, timestamp: &str, ext: &str) -> PathBuf {
    dir.join(format!("{stem}_{timestamp}.{ext}"))
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))
}

pub fn write_csv(path: &Path, table: &tracker_lib::Table) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    table
        .write_csv(BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "active" => status.green().to_string(),
        "inactive" => status.dimmed().to_string(),
        "complete" => status.green().to_string(),
        "partial" => status.yellow().to_string(),
        "incomplete" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Color a readiness score by how easy the migration looks
pub fn color_score(score: u8) -> String {
    let formatted = score.to_string();
    if score >= 80 {
        formatted.green().to_string()
    } else if score >= 60 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_file_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 5, 3).unwrap();
        assert_eq!(file_timestamp(at), "20240601_090503");
        assert_eq!(
            output_path(Path::new("reports"), "summary", "20240601_090503", "json"),
            PathBuf::from("reports/summary_20240601_090503.json")
        );
    }

    #[test]
    fn test_write_csv_creates_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dc01").join("cluster_report_x.csv");
        let mut table = tracker_lib::Table::new(["Cluster"]);
        table.push_row(["dc01-k8s-n-01"]);

        write_csv(&path, &table).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Cluster\ndc01-k8s-n-01\n"
        );
    }
}
