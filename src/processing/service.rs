//! Document processor wiring classification, extraction, and abstraction together.

use crate::{
    config::Config,
    llm::{LlmClient, LlmClientError, build_llm_client},
    outcome::Outcome,
    processing::{
        classify::{ContentSniffer, MagicSniffer, classify},
        extract::{Extraction, PdfContent, extract_csv, extract_excel, extract_pdf, extract_text},
        normalize::{char_len, line_count, normalize_text},
        summarize::abstract_text,
        table::Table,
        tabular::{analyze_table, empty_table_message},
        types::{Abstraction, FileType, ProcessingResult, Structure},
    },
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Stage error stored for files the classifier could not place.
pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type or detection failed.";

/// Runs the classify, extract, and abstract pipeline for one file at a time.
///
/// The processor holds no mutable state: construct it once and share it through an `Arc`
/// between the CLI batch loop and the HTTP surface.
pub struct DocumentProcessor {
    llm: Box<dyn LlmClient>,
    sniffer: Box<dyn ContentSniffer>,
    max_tokens: u32,
}

/// Abstraction over the pipeline used by external surfaces (CLI, HTTP).
#[async_trait]
pub trait ProcessingApi: Send + Sync {
    /// Process the file at `path` into a result document.
    async fn process(&self, path: &Path) -> ProcessingResult;
}

impl DocumentProcessor {
    /// Build a processor from explicit collaborators.
    pub fn new(llm: Box<dyn LlmClient>, sniffer: Box<dyn ContentSniffer>, max_tokens: u32) -> Self {
        Self {
            llm,
            sniffer,
            max_tokens,
        }
    }

    /// Build a processor with the configured LLM provider and magic-byte sniffing.
    pub fn from_config(config: &Config) -> Result<Self, LlmClientError> {
        tracing::info!(
            provider = ?config.llm_provider,
            model = config.model_label(),
            max_tokens = config.llm_max_tokens,
            "Initializing LLM client"
        );
        let llm = build_llm_client(config)?;
        Ok(Self::new(llm, Box::new(MagicSniffer), config.llm_max_tokens))
    }

    /// Token budget requested for every completion.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Process one file. Never fails: every problem is recorded in the returned document.
    pub async fn process(&self, path: impl AsRef<Path>) -> ProcessingResult {
        let path = path.as_ref();
        let file_path = path.display().to_string();
        if !path.is_file() {
            tracing::error!(path = %file_path, "File does not exist");
            return ProcessingResult::missing_file(file_path);
        }

        let file_type = classify(path, self.sniffer.as_ref());
        tracing::info!(path = %file_path, file_type = %file_type, "Processing document");

        let result = match file_type {
            FileType::Pdf => self.process_pdf(path, file_path).await,
            FileType::Text => self.process_text(path, file_path).await,
            FileType::Excel | FileType::Csv => self.process_table(path, file_path, file_type).await,
            FileType::Unknown => ProcessingResult::new(
                file_path,
                FileType::Unknown,
                Structure::unavailable(),
                Abstraction::Error(UNSUPPORTED_FILE_TYPE.into()),
            ),
        };
        tracing::info!(path = %result.file_path, "Document processed");
        result
    }

    async fn process_pdf(&self, path: &Path, file_path: String) -> ProcessingResult {
        let content = run_blocking(path, extract_pdf)
            .await
            .unwrap_or_else(|reason| PdfContent {
                text: Outcome::Failed(reason),
                page_count: 0,
            });
        let raw_text = content.text.unwrap_or_default();
        let structure = Structure::Pdf {
            pages: content.page_count,
            length_of_text: char_len(&normalize_text(&raw_text)),
        };
        let abstraction = abstract_text(&raw_text, self.llm.as_ref(), self.max_tokens).await;
        ProcessingResult::new(file_path, FileType::Pdf, structure, abstraction)
            .with_raw_text(raw_text)
    }

    async fn process_text(&self, path: &Path, file_path: String) -> ProcessingResult {
        let raw_text = run_blocking(path, extract_text)
            .await
            .unwrap_or_else(Outcome::Failed)
            .unwrap_or_default();
        let structure = Structure::Text {
            length: char_len(&normalize_text(&raw_text)),
            lines: line_count(&raw_text),
        };
        let abstraction = abstract_text(&raw_text, self.llm.as_ref(), self.max_tokens).await;
        ProcessingResult::new(file_path, FileType::Text, structure, abstraction)
            .with_raw_text(raw_text)
    }

    async fn process_table(
        &self,
        path: &Path,
        file_path: String,
        file_type: FileType,
    ) -> ProcessingResult {
        let extractor: fn(&Path) -> Extraction<Table> = match file_type {
            FileType::Excel => extract_excel,
            _ => extract_csv,
        };
        let extraction = run_blocking(path, extractor)
            .await
            .unwrap_or_else(Outcome::Failed);
        let Some(table) = extraction.into_option() else {
            return ProcessingResult::new(
                file_path,
                file_type,
                Structure::unavailable(),
                Abstraction::Error(empty_table_message(file_type)),
            );
        };
        let analysis = analyze_table(table, file_type, self.llm.as_ref(), self.max_tokens).await;
        ProcessingResult::new(file_path, file_type, analysis.structure, analysis.abstraction)
    }
}

/// Run a synchronous extractor on the blocking pool.
///
/// A task that panics or is cancelled comes back as its join error message.
async fn run_blocking<T, F>(path: &Path, extract: F) -> Result<T, String>
where
    F: FnOnce(&Path) -> T + Send + 'static,
    T: Send + 'static,
{
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || extract(&owned))
        .await
        .map_err(|error| {
            tracing::error!(path = %path.display(), error = %error, "Extraction task failed");
            format!("Extraction task failed: {error}")
        })
}

#[async_trait]
impl ProcessingApi for DocumentProcessor {
    async fn process(&self, path: &Path) -> ProcessingResult {
        DocumentProcessor::process(self, path).await
    }
}

/// Collect up to `limit` supported files below `dir`, sorted by path.
///
/// Files are filtered by extension only; content sniffing happens later, per file.
pub fn collect_documents(dir: &Path, limit: usize) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut documents = Vec::new();
    if limit == 0 {
        return Ok(documents);
    }
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if FileType::from_extension(entry.path()) == FileType::Unknown {
            tracing::debug!(path = %entry.path().display(), "Skipping unsupported file");
            continue;
        }
        documents.push(entry.into_path());
        if documents.len() == limit {
            tracing::info!(limit, "Batch limit reached");
            break;
        }
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedClient;
    use crate::processing::classify::NoSniffer;
    use crate::processing::extract::testing::sample_pdf;
    use crate::processing::summarize::NO_MEANINGFUL_TEXT;
    use serde_json::json;
    use std::fs;

    fn processor(llm: ScriptedClient) -> DocumentProcessor {
        DocumentProcessor::new(Box::new(llm), Box::new(NoSniffer), 3000)
    }

    #[tokio::test]
    async fn missing_file_yields_top_level_error() {
        let processor = processor(ScriptedClient::default());
        let result = processor.process("/no/such/report.pdf").await;

        assert_eq!(
            serde_json::to_value(&result).expect("json"),
            json!({
                "file_path": "/no/such/report.pdf",
                "file_type": "unknown",
                "error": "File does not exist."
            })
        );
    }

    #[tokio::test]
    async fn unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("archive.bin");
        fs::write(&path, b"\x00\x01\x02").expect("write");

        let result = processor(ScriptedClient::default()).process(&path).await;

        assert_eq!(result.file_type, FileType::Unknown);
        assert_eq!(result.structure, Some(Structure::unavailable()));
        assert_eq!(
            result.abstracted_data.as_ref().and_then(Abstraction::error),
            Some(UNSUPPORTED_FILE_TYPE)
        );
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn short_text_file_reports_structure_and_marker() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("note.txt");
        fs::write(&path, "hi\nthere").expect("write");

        let result = processor(ScriptedClient::default()).process(&path).await;

        assert_eq!(result.file_type, FileType::Text);
        assert_eq!(
            result.structure,
            Some(Structure::Text {
                length: 8,
                lines: 2
            })
        );
        assert_eq!(
            result.abstracted_data,
            Some(Abstraction::FullDocSummary(NO_MEANINGFUL_TEXT.into()))
        );
        assert_eq!(result.raw_text.as_deref(), Some("hi\nthere"));
    }

    #[tokio::test]
    async fn whitespace_only_text_keeps_its_lines_and_raw_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("blank.txt");
        fs::write(&path, "  \n\n\n").expect("write");

        let result = processor(ScriptedClient::default()).process(&path).await;

        assert_eq!(
            result.structure,
            Some(Structure::Text {
                length: 0,
                lines: 4
            })
        );
        assert_eq!(result.raw_text.as_deref(), Some("  \n\n\n"));
        assert_eq!(
            result.abstracted_data,
            Some(Abstraction::FullDocSummary(NO_MEANINGFUL_TEXT.into()))
        );
    }

    #[tokio::test]
    async fn pdf_file_reports_pages_and_text_length() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.pdf");
        let bytes = sample_pdf(&[
            "Shipping delays fell by a third after the new warehouse opened",
            "Returns stayed flat across every region this quarter",
        ]);
        fs::write(&path, bytes).expect("write");

        let llm = ScriptedClient::replying(["pdf summary"]);
        let result = processor(llm).process(&path).await;

        assert_eq!(result.file_type, FileType::Pdf);
        let Some(Structure::Pdf {
            pages,
            length_of_text,
        }) = result.structure.clone()
        else {
            panic!("expected pdf structure, got {:?}", result.structure);
        };
        assert_eq!(pages, 2);
        assert!(length_of_text > 0);
        assert!(result.raw_text.as_deref().is_some_and(|text| text.contains("warehouse")));

        let value = serde_json::to_value(&result).expect("json");
        assert_eq!(value["file_type"], "pdf");
        assert_eq!(value["structure"]["pages"], 2);
        assert_eq!(value["structure"]["length_of_text"], length_of_text);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn extraction_runs_on_a_multi_thread_runtime() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scores.csv");
        fs::write(&path, "1,alice,90\n").expect("write");

        let llm = ScriptedClient::replying([r#"["id","name","score"]"#, "One student."]);
        let result = processor(llm).process(&path).await;

        assert_eq!(
            result.abstracted_data,
            Some(Abstraction::Insights("One student.".into()))
        );
    }

    #[tokio::test]
    async fn empty_csv_reports_stage_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").expect("write");

        let result = processor(ScriptedClient::default()).process(&path).await;

        assert_eq!(result.file_type, FileType::Csv);
        assert_eq!(
            result.abstracted_data,
            Some(Abstraction::Error("CSV file extraction failed or empty.".into()))
        );
    }

    #[tokio::test]
    async fn csv_file_gets_structure_and_insights() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scores.csv");
        fs::write(&path, "1,alice,90\n2,bob,85\n").expect("write");

        let llm = ScriptedClient::replying([r#"["id","name","score"]"#, "Two students."]);
        let result = processor(llm).process(&path).await;

        let value = serde_json::to_value(&result).expect("json");
        assert_eq!(value["file_type"], "csv");
        assert_eq!(value["structure"]["rows"], 2);
        assert_eq!(value["structure"]["cols"], 3);
        assert_eq!(value["structure"]["factual_data"]["factual_rows"], 2);
        assert_eq!(
            value["structure"]["suggested_schema_raw"],
            r#"["id","name","score"]"#
        );
        assert_eq!(value["abstracted_data"], json!({ "insights": "Two students." }));
        assert!(value.get("raw_text").is_none());
    }

    #[test]
    fn collect_documents_filters_sorts_and_limits() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.txt", "a.csv", "c.pdf", "skip.bin", "d.md"] {
            fs::write(dir.path().join(name), "x").expect("write");
        }
        fs::create_dir(dir.path().join("nested")).expect("mkdir");
        fs::write(dir.path().join("nested").join("e.xlsx"), "x").expect("write");

        let all = collect_documents(dir.path(), 15).expect("walk");
        let names: Vec<_> = all
            .iter()
            .map(|path| path.file_name().and_then(|n| n.to_str()).unwrap_or_default())
            .collect();
        assert_eq!(names, ["a.csv", "b.txt", "c.pdf", "d.md", "e.xlsx"]);

        assert_eq!(collect_documents(dir.path(), 2).expect("walk").len(), 2);
    }
}
