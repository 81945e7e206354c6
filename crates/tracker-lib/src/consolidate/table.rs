//! Flat row/column tables exchanged as CSV report files

use crate::error::Result;
use serde::Serialize;
use std::cmp::Ordering;
use std::io::{Read, Write};

/// Canonical form of a column header: trimmed, spaces replaced with `_`,
/// lowercased. `" Total Pods"` and `"total_pods"` name the same column.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().replace(' ', "_").to_lowercase()
}

/// Ordered headers plus rows of text cells. Every row has exactly one cell
/// per header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, padding with empty cells or truncating to the header width
    pub fn push_row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// First of `names` present in the table
    pub fn first_column(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|name| self.column(name))
    }

    /// Cell text of `column` in `row`, `None` when the column is absent
    pub fn cell<'a>(&self, row: &'a [String], column: &str) -> Option<&'a str> {
        self.column(column).map(|idx| row[idx].as_str())
    }

    pub fn normalize_headers(&mut self) {
        for header in &mut self.headers {
            *header = normalize_column_name(header);
        }
    }

    /// Add a column filled with `value` unless one with that name exists
    pub fn ensure_column(&mut self, name: &str, value: &str) -> bool {
        if self.column(name).is_some() {
            return false;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(value.to_string());
        }
        true
    }

    /// Stable sort of the rows
    pub fn sort_rows_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&[String], &[String]) -> Ordering,
    {
        self.rows.sort_by(|a, b| compare(a, b));
    }

    /// Concatenate tables whose headers may differ. Headers are unioned in
    /// first-seen order; cells a source lacks are left empty.
    pub fn concat<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Table {
        let tables: Vec<&Table> = tables.into_iter().collect();

        let mut merged = Table::default();
        for table in &tables {
            for header in &table.headers {
                if merged.column(header).is_none() {
                    merged.headers.push(header.clone());
                }
            }
        }

        for table in tables {
            let mapping: Vec<usize> = merged
                .headers
                .iter()
                .map(|h| table.column(h).unwrap_or(usize::MAX))
                .collect();
            for row in &table.rows {
                let cells: Vec<String> = mapping
                    .iter()
                    .map(|&idx| row.get(idx).cloned().unwrap_or_default())
                    .collect();
                merged.rows.push(cells);
            }
        }

        merged
    }

    /// Row labelled `label` in `label_column` whose cells are the column
    /// sums wherever every row holds a number, empty elsewhere
    pub fn totals_row(&self, label_column: &str, label: &str) -> Vec<String> {
        let label_idx = self.column(label_column);
        (0..self.headers.len())
            .map(|idx| {
                if Some(idx) == label_idx {
                    return label.to_string();
                }
                let values: Option<Vec<f64>> =
                    self.rows.iter().map(|row| parse_number(&row[idx])).collect();
                match values {
                    Some(values) if !values.is_empty() => format_number(values.iter().sum()),
                    _ => String::new(),
                }
            })
            .collect()
    }

    /// Read a CSV document whose first record is the header line.
    /// Ragged records are padded or truncated to the header width.
    pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut table = Table::new(headers);
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter());
        }
        Ok(table)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integers print without a fractional part
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Compare text cells with empty cells last
pub fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => a.cmp(b),
    }
}
