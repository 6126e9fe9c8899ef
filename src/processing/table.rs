//! Header-less grid of primitive values read from CSV or spreadsheet files.

use super::types::FactualData;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Tokens read as missing values in delimited text.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One grid value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Missing value.
    Empty,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Any other text.
    Text(String),
}

impl Cell {
    /// Interpret a raw delimited field.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_MARKERS.contains(&trimmed) {
            return Self::Empty;
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return Self::Int(value);
        }
        if let Ok(value) = trimmed.parse::<f64>() {
            return if value.is_nan() {
                Self::Empty
            } else {
                Self::Float(value)
            };
        }
        match trimmed {
            "True" | "TRUE" | "true" => Self::Bool(true),
            "False" | "FALSE" | "false" => Self::Bool(false),
            _ => Self::Text(raw.to_string()),
        }
    }

    /// Whether the cell holds no value.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(value) => write!(f, "{}", if *value { "True" } else { "False" }),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) if value.fract() == 0.0 && value.abs() < 1e16 => {
                write!(f, "{value:.1}")
            }
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Raised when proposed column labels do not fit the grid.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected {expected} column labels, got {actual}")]
pub struct LabelMismatch {
    /// Number of columns in the grid.
    pub expected: usize,
    /// Number of labels offered.
    pub actual: usize,
}

/// Rectangular grid with positional column labels until a schema is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    labels: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a grid, padding short rows with missing cells up to the widest row.
    pub fn from_rows(mut rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Self {
            labels: (0..width).map(|index| index.to_string()).collect(),
            rows,
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.labels.len()
    }

    /// A grid without rows or without columns holds no data.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.column_count() == 0
    }

    /// Current column labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Rows in file order.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Up to the first `limit` rows.
    pub fn head(&self, limit: usize) -> &[Vec<Cell>] {
        &self.rows[..self.rows.len().min(limit)]
    }

    /// Count rows and columns holding at least one non-missing value, independently per axis.
    pub fn factual_density(&self) -> FactualData {
        let factual_rows = self
            .rows
            .iter()
            .filter(|row| row.iter().any(|cell| !cell.is_missing()))
            .count();
        let factual_cols = (0..self.column_count())
            .filter(|&column| self.rows.iter().any(|row| !row[column].is_missing()))
            .count();
        FactualData {
            factual_rows,
            factual_cols,
        }
    }

    /// Replace the column labels; the count must match the column count.
    pub fn apply_labels(&mut self, labels: Vec<String>) -> Result<(), LabelMismatch> {
        if labels.len() != self.column_count() {
            return Err(LabelMismatch {
                expected: self.column_count(),
                actual: labels.len(),
            });
        }
        self.labels = labels;
        Ok(())
    }

    /// Render up to `limit` rows as a JSON array of arrays.
    pub fn head_json(&self, limit: usize) -> String {
        serde_json::to_string(self.head(limit)).unwrap_or_default()
    }

    /// Render the labels and up to `limit` rows as CSV.
    pub fn head_csv(&self, limit: usize) -> Result<String, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record(&self.labels)?;
        for row in self.head(limit) {
            writer.write_record(row.iter().map(ToString::to_string))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|error| csv::Error::from(error.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
