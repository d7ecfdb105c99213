//! Tabular data
//!
//! A minimal column-named table used for training data. CSV fields and JSON
//! request values both land in [`Cell`]s so the preparer and the predictor
//! share one value model.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

use super::error::{DetectorError, DetectorResult};

/// A single table value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Parse a raw text field. Numeric-looking text becomes a number.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Number(n),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    /// Convert a JSON request value
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Cell::Missing,
            serde_json::Value::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
            serde_json::Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Missing),
            serde_json::Value::String(s) => Cell::parse(s),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Numeric value for the model. Missing cells count as zero.
    pub fn to_feature(&self, column: &str) -> DetectorResult<f64> {
        match self {
            Cell::Number(n) => Ok(*n),
            Cell::Missing => Ok(0.0),
            Cell::Text(s) => Err(DetectorError::NonNumericFeature {
                column: column.to_string(),
                value: s.clone(),
            }),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Missing => Ok(()),
        }
    }
}

/// Rows of cells under ordered column names
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table. Every row must have one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> DetectorResult<Self> {
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(DetectorError::RaggedRow {
                row,
                expected: columns.len(),
                actual: cells.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Load a CSV (or TSV, by extension) file with a header row
    pub fn from_csv_path(path: &Path) -> DetectorResult<Self> {
        let file = File::open(path).map_err(|e| DetectorError::io(path, e))?;

        let is_tsv = path.extension().map(|e| e == "tsv").unwrap_or(false);
        let delimiter = if is_tsv { b'\t' } else { b',' };

        Self::from_csv_reader(BufReader::new(file), delimiter)
    }

    pub fn from_csv_reader<R: Read>(reader: R, delimiter: u8) -> DetectorResult<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(reader);

        let columns: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(Cell::parse).collect());
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Copy of one column's cells
    pub fn column(&self, name: &str) -> Option<Vec<Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].clone()).collect())
    }

    /// Replace one column's cells in place
    pub fn set_column(&mut self, name: &str, cells: Vec<Cell>) {
        if let Some(idx) = self.column_index(name) {
            for (row, cell) in self.rows.iter_mut().zip(cells) {
                row[idx] = cell;
            }
        }
    }

    /// Drop a column, returning its cells. Absent columns are a no-op.
    pub fn remove_column(&mut self, name: &str) -> Option<Vec<Cell>> {
        let idx = self.column_index(name)?;
        self.columns.remove(idx);
        Some(self.rows.iter_mut().map(|r| r.remove(idx)).collect())
    }

    /// Drop every listed column that exists, returning the names removed
    pub fn drop_columns(&mut self, names: &[&str]) -> Vec<String> {
        names
            .iter()
            .filter_map(|name| self.remove_column(name).map(|_| name.to_string()))
            .collect()
    }
}
