//! Tabular analysis: factual density, schema inference, and narrative insights.
//!
//! The model is asked twice, sequentially. The schema suggestion is always stored verbatim and
//! only applied when it parses as a list of strings whose length matches the column count; the
//! insight prompt then sees the sample under whatever labels the grid carries at that point.

use super::table::Table;
use super::types::{Abstraction, FileType, Structure};
use crate::llm::{LlmClient, prompts};

/// Rows included in each prompt sample.
pub const SAMPLE_ROWS: usize = 5;

/// Structure and abstraction for one grid, plus the labels it ended up with.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularAnalysis {
    /// Dimensions, factual density, and the raw schema suggestion.
    pub structure: Structure,
    /// Insights, or the stage error for an empty grid.
    pub abstraction: Abstraction,
    /// Column labels after schema application.
    pub column_labels: Vec<String>,
}

/// Error message stored for a grid that could not be read or held no data.
pub fn empty_table_message(source: FileType) -> String {
    format!("{} file extraction failed or empty.", source.label())
}

/// Analyze an extracted grid.
pub async fn analyze_table(
    mut table: Table,
    source: FileType,
    llm: &dyn LlmClient,
    max_tokens: u32,
) -> TabularAnalysis {
    if table.is_empty() {
        tracing::warn!(file_type = %source, "Tabular data is empty");
        return TabularAnalysis {
            structure: Structure::unavailable(),
            abstraction: Abstraction::Error(empty_table_message(source)),
            column_labels: table.labels().to_vec(),
        };
    }

    let factual_data = table.factual_density();
    let rows = table.row_count();
    let cols = table.column_count();
    tracing::info!(
        rows,
        cols,
        factual_rows = factual_data.factual_rows,
        factual_cols = factual_data.factual_cols,
        "Measured table"
    );

    let schema_prompt = prompts::schema_inference_prompt(&table.head_json(SAMPLE_ROWS));
    let suggested_schema_raw = llm.complete(&schema_prompt, max_tokens).await.into_text();
    apply_suggested_schema(&mut table, &suggested_schema_raw);

    let insights = match table.head_csv(SAMPLE_ROWS) {
        Ok(sample) => llm
            .complete(&prompts::insight_prompt(&sample), max_tokens)
            .await
            .into_text(),
        Err(error) => {
            tracing::error!(error = %error, "Failed to render table sample");
            String::new()
        }
    };

    TabularAnalysis {
        structure: Structure::Tabular {
            rows,
            cols,
            factual_data,
            suggested_schema_raw,
        },
        abstraction: Abstraction::Insights(insights),
        column_labels: table.labels().to_vec(),
    }
}

/// Apply a schema suggestion when it is a JSON list of strings of the right length.
///
/// Returns whether the labels changed.
pub fn apply_suggested_schema(table: &mut Table, raw: &str) -> bool {
    let labels: Vec<String> = match serde_json::from_str(raw.trim()) {
        Ok(labels) => labels,
        Err(error) => {
            tracing::warn!(error = %error, "Could not parse schema suggestion");
            return false;
        }
    };
    match table.apply_labels(labels) {
        Ok(()) => {
            tracing::info!(labels = ?table.labels(), "Applied suggested schema");
            true
        }
        Err(mismatch) => {
            tracing::warn!(error = %mismatch, "Suggested schema does not fit the table");
            false
        }
    }
}
