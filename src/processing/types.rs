//! Result document produced by one pipeline invocation.

use serde::Serialize;
use std::fmt;

/// Document kinds recognised by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Portable Document Format.
    Pdf,
    /// Plain text (`.txt`, `.md`, `.log`, or any sniffed `text/*`).
    Text,
    /// Excel workbook (`.xlsx`, `.xls`).
    Excel,
    /// Comma-separated values.
    Csv,
    /// Anything else, including paths that do not exist.
    Unknown,
}

impl FileType {
    /// Lowercase identifier used in result documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
            Self::Excel => "excel",
            Self::Csv => "csv",
            Self::Unknown => "unknown",
        }
    }

    /// Human-facing label used in stage error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Text => "Text",
            Self::Excel => "Excel",
            Self::Csv => "CSV",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether the type goes through the tabular analyzer.
    pub fn is_tabular(self) -> bool {
        matches!(self, Self::Excel | Self::Csv)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count of rows and columns that hold at least one non-missing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FactualData {
    /// Rows with at least one non-missing cell.
    pub factual_rows: usize,
    /// Columns with at least one non-missing cell.
    pub factual_cols: usize,
}

/// Structural metadata, shaped by file type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Structure {
    /// PDF page count and normalized text length.
    Pdf {
        /// Number of pages reported by the document.
        pages: usize,
        /// Character count of the normalized text.
        length_of_text: usize,
    },
    /// Plain-text length and line count.
    Text {
        /// Character count of the normalized text.
        length: usize,
        /// Newline count plus one.
        lines: usize,
    },
    /// Grid dimensions, factual density, and the raw schema suggestion.
    Tabular {
        /// Number of rows in the grid.
        rows: usize,
        /// Number of columns in the grid.
        cols: usize,
        /// Factual density per axis.
        factual_data: FactualData,
        /// Model response to the schema prompt, stored verbatim.
        suggested_schema_raw: String,
    },
    /// Nothing could be measured (unsupported type or empty table).
    Unavailable(EmptyStructure),
}

impl Structure {
    /// Structure for documents that produced no measurable data.
    pub fn unavailable() -> Self {
        Self::Unavailable(EmptyStructure {})
    }
}

/// Serializes as an empty object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmptyStructure {}

/// LLM-derived content attached to a document. Exactly one key is present once encoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Abstraction {
    /// One labeled summary per chapter section that was long enough to summarize.
    ChapterSummaries(Vec<String>),
    /// Single summary of the whole normalized document.
    FullDocSummary(String),
    /// Narrative analysis of a tabular sample.
    Insights(String),
    /// Stage-level failure.
    Error(String),
}

impl Abstraction {
    /// Stage error message, if this abstraction records one.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Everything the pipeline learned about one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingResult {
    /// Path as supplied by the caller.
    pub file_path: String,
    /// Classified file type.
    pub file_type: FileType,
    /// Structural metadata; absent when the file could not be opened at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<Structure>,
    /// Summary, insight, or stage error; absent when the file could not be opened at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstracted_data: Option<Abstraction>,
    /// Extracted text for text-like documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    /// Input-level failure that stopped the pipeline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingResult {
    /// Result for a path that does not point at a readable file.
    pub fn missing_file(file_path: String) -> Self {
        Self {
            file_path,
            file_type: FileType::Unknown,
            structure: None,
            abstracted_data: None,
            raw_text: None,
            error: Some("File does not exist.".into()),
        }
    }

    /// Result carrying structure and abstraction for a classified file.
    pub fn new(
        file_path: String,
        file_type: FileType,
        structure: Structure,
        abstraction: Abstraction,
    ) -> Self {
        Self {
            file_path,
            file_type,
            structure: Some(structure),
            abstracted_data: Some(abstraction),
            raw_text: None,
            error: None,
        }
    }

    /// Attach the extracted text.
    pub fn with_raw_text(mut self, raw_text: String) -> Self {
        self.raw_text = Some(raw_text);
        self
    }
}
