// src/tables.rs

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::error::PipelineError;

/// In-memory, schemaless CSV table.
///
/// The pipeline only inspects the name and partition columns structurally;
/// every other column passes through untouched, so rows are kept as plain
/// string vectors padded to the header width.
#[derive(Debug, Clone)]
pub struct Table {
    /// Identity used in error messages and enrichment column suffixes.
    pub name: String,
    headers: Vec<String>,
    header_index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: &str, headers: Vec<String>) -> Self {
        let header_index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        Table {
            name: name.to_string(),
            headers,
            header_index,
            rows: Vec::new(),
        }
    }

    /// Loads a CSV file fully into memory. All values are kept as text.
    pub fn from_csv_path(path: &Path, name: &str) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open '{}' table at {}", name, path.display()))?;
        Self::from_reader(file, name)
            .with_context(|| format!("Failed to read '{}' table at {}", name, path.display()))
    }

    pub fn from_reader<R: Read>(reader: R, name: &str) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut table = Table::new(name, headers);
        for (line, record) in csv_reader.records().enumerate() {
            let record =
                record.with_context(|| format!("Malformed CSV record at data row {}", line + 1))?;
            let mut row: Vec<String> = record.iter().map(|v| v.to_string()).collect();
            row.resize(table.headers.len(), String::new());
            table.rows.push(row);
        }

        debug!(
            "Loaded {} row(s) into the '{}' table",
            table.rows.len(),
            table.name
        );
        Ok(table)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolves a column name, failing fast with the table identity when the
    /// column is absent.
    pub fn column_index(&self, column: &str) -> Result<usize, PipelineError> {
        self.header_index
            .get(column)
            .copied()
            .ok_or_else(|| PipelineError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    pub fn value(&self, row: usize, column_index: usize) -> &str {
        self.rows[row]
            .get(column_index)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Appends a derived column; re-running a derivation overwrites the
    /// existing column of the same name. `values` must hold one entry per row.
    pub fn push_column(&mut self, column: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        if let Some(&idx) = self.header_index.get(column) {
            for (row, value) in self.rows.iter_mut().zip(values) {
                row[idx] = value;
            }
            return;
        }
        self.header_index
            .insert(column.to_string(), self.headers.len());
        self.headers.push(column.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn write_csv_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let mut writer = csv::WriterBuilder::new()
            .from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer
            .write_record(&self.headers)
            .context("Failed to write CSV headers")?;
        for row in &self.rows {
            writer.write_record(row).with_context(|| {
                format!("Failed to write row to '{}' table output", self.name)
            })?;
        }
        writer.flush().context("Failed to flush CSV writer")?;
        debug!(
            "Wrote {} row(s) of the '{}' table to {}",
            self.rows.len(),
            self.name,
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_are_padded_to_header_width() {
        let table =
            Table::from_reader("a,b,c\n1,2\n4,5,6,7\n".as_bytes(), "test").expect("parses");
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, 2), "");
        assert_eq!(table.value(1, 2), "6");
    }

    #[test]
    fn missing_column_names_table_and_column() {
        let table = Table::from_reader("a,b\n1,2\n".as_bytes(), "sri").expect("parses");
        let err = table.column_index("provincia").expect_err("must be absent");
        let message = err.to_string();
        assert!(message.contains("provincia"));
        assert!(message.contains("sri"));
    }

    #[test]
    fn push_column_overwrites_existing() {
        let mut table = Table::from_reader("a\n1\n2\n".as_bytes(), "test").expect("parses");
        table.push_column("b", vec!["x".into(), "y".into()]);
        table.push_column("b", vec!["z".into(), "w".into()]);
        assert_eq!(table.headers(), &["a".to_string(), "b".to_string()]);
        let idx = table.column_index("b").expect("exists");
        assert_eq!(table.value(1, idx), "w");
    }
}
