//! Raw data extraction for each supported file type.
//!
//! Extractors never raise. Failures are logged and reported as [`Outcome::Failed`]; files that
//! open fine but hold nothing come back as [`Outcome::Empty`]. Text counts as empty only when it
//! has zero length: whitespace-only content is returned as read, so line counts stay accurate.
//! Every file handle is opened and dropped inside the extractor call.

use super::table::{Cell, Table};
use crate::outcome::Outcome;
use calamine::{Data, Reader, open_workbook_auto};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use thiserror::Error;

/// Outcome of one extraction.
pub type Extraction<T> = Outcome<T>;

/// Errors raised while reading a file, before they are folded into an [`Extraction`].
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The PDF could not be parsed.
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    /// The delimited file could not be parsed.
    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),
    /// The workbook could not be opened or read.
    #[error("Spreadsheet extraction failed: {0}")]
    Spreadsheet(String),
}

/// Text and page count pulled from a PDF.
///
/// The page count is read independently of the text, so a PDF whose text layer fails to
/// decode still reports its pages.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfContent {
    /// Concatenated page text.
    pub text: Extraction<String>,
    /// Number of pages, `0` when the document structure could not be read.
    pub page_count: usize,
}

/// Read a text file, replacing invalid UTF-8 sequences.
pub fn extract_text(path: &Path) -> Extraction<String> {
    settle(path, "text", read_text(path), String::is_empty)
}

/// Pull the text layer and page count from a PDF.
pub fn extract_pdf(path: &Path) -> PdfContent {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!(path = %path.display(), error = %error, "Error reading PDF file");
            return PdfContent {
                text: Outcome::Failed(ExtractError::from(error).to_string()),
                page_count: 0,
            };
        }
    };

    PdfContent {
        text: settle(path, "PDF", pdf_text(&bytes), String::is_empty),
        page_count: pdf_page_count(path, &bytes),
    }
}

/// Read a header-less CSV file into a grid.
pub fn extract_csv(path: &Path) -> Extraction<Table> {
    settle(path, "CSV", read_csv(path), Table::is_empty)
}

/// Read the first worksheet of an Excel workbook into a grid.
pub fn extract_excel(path: &Path) -> Extraction<Table> {
    settle(path, "Excel", read_excel(path), Table::is_empty)
}

fn settle<T>(
    path: &Path,
    kind: &str,
    result: Result<T, ExtractError>,
    is_empty: impl Fn(&T) -> bool,
) -> Extraction<T> {
    match result {
        Ok(value) if is_empty(&value) => {
            tracing::warn!(path = %path.display(), kind, "Extraction produced no data");
            Outcome::Empty
        }
        Ok(value) => {
            tracing::info!(path = %path.display(), kind, "Extracted data");
            Outcome::Value(value)
        }
        Err(error) => {
            tracing::error!(path = %path.display(), kind, error = %error, "Extraction failed");
            Outcome::Failed(error.to_string())
        }
    }
}

fn read_text(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    tracing::debug!(path = %path.display(), length = text.len(), "Read text file");
    Ok(text)
}

/// `pdf-extract` panics on some malformed fonts, so the call is isolated with `catch_unwind`.
fn pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(error)) => Err(ExtractError::Pdf(error.to_string())),
        Err(_panic) => Err(ExtractError::Pdf(
            "extractor panicked, likely on a malformed font".into(),
        )),
    }
}

fn pdf_page_count(path: &Path, bytes: &[u8]) -> usize {
    match lopdf::Document::load_mem(bytes) {
        Ok(document) => document.get_pages().len(),
        Err(error) => {
            tracing::warn!(path = %path.display(), error = %error, "Could not count PDF pages");
            0
        }
    }
}

fn read_csv(path: &Path) -> Result<Table, ExtractError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::parse).collect());
    }
    let table = Table::from_rows(rows);
    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        cols = table.column_count(),
        "Parsed CSV grid"
    );
    Ok(table)
}

fn read_excel(path: &Path) -> Result<Table, ExtractError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|error| ExtractError::Spreadsheet(error.to_string()))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|error| ExtractError::Spreadsheet(error.to_string()))?,
        None => return Ok(Table::default()),
    };
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    let table = Table::from_rows(rows);
    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        cols = table.column_count(),
        "Parsed worksheet grid"
    );
    Ok(table)
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(value) => Cell::Int(*value),
        Data::Float(value) if value.is_nan() => Cell::Empty,
        Data::Float(value) => Cell::Float(*value),
        Data::Bool(value) => Cell::Bool(*value),
        Data::String(value) if value.trim().is_empty() => Cell::Empty,
        Data::String(value) => Cell::Text(value.clone()),
        other => Cell::Text(other.to_string()),
    }
}
