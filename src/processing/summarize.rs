//! Chapter-aware summarization strategy for text-like documents.
//!
//! A document with detected chapter headings is summarized section by section; anything else is
//! normalized and summarized as a whole. The two paths are exclusive: an all-skipped chapter
//! list stays an empty `chapter_summaries` and never falls through to a whole-document summary.

use super::normalize::{char_len, normalize_text};
use super::segment::segment;
use super::types::Abstraction;
use crate::llm::{LlmClient, prompts};

/// Marker returned instead of calling the model on near-empty input.
pub const NO_MEANINGFUL_TEXT: &str = "No meaningful text to summarize.";
/// Normalized documents shorter than this are not sent to the model.
pub const MIN_DOCUMENT_CHARS: usize = 10;
/// Chapter sections shorter than this (after trimming) are skipped.
pub const MIN_CHAPTER_CHARS: usize = 50;

/// Produce the abstraction for a text-like document.
pub async fn abstract_text(raw_text: &str, llm: &dyn LlmClient, max_tokens: u32) -> Abstraction {
    let sections = segment(raw_text);
    if sections.len() <= 1 {
        let cleaned = normalize_text(raw_text);
        return Abstraction::FullDocSummary(summarize_text(&cleaned, llm, max_tokens).await);
    }

    Abstraction::ChapterSummaries(summarize_chapters(&sections, llm, max_tokens).await)
}

/// Summarize already-normalized text as a whole.
pub async fn summarize_text(cleaned: &str, llm: &dyn LlmClient, max_tokens: u32) -> String {
    if char_len(cleaned) < MIN_DOCUMENT_CHARS {
        return NO_MEANINGFUL_TEXT.to_string();
    }
    llm.complete(&prompts::summarization_prompt(cleaned), max_tokens)
        .await
        .into_text()
}

/// Summarize each sufficiently long section, labeled 1-based by its position in the split.
///
/// A blank leading piece (text opening directly with a heading) is not a section. Otherwise the
/// text before the first heading is section 1.
pub async fn summarize_chapters(
    sections: &[String],
    llm: &dyn LlmClient,
    max_tokens: u32,
) -> Vec<String> {
    let sections = match sections.split_first() {
        Some((first, rest)) if first.trim().is_empty() => rest,
        _ => sections,
    };
    let mut summaries = Vec::new();
    for (index, section) in sections.iter().enumerate() {
        let position = index + 1;
        let body = section.trim();
        if char_len(body) < MIN_CHAPTER_CHARS {
            tracing::debug!(position, "Skipping short chapter section");
            continue;
        }
        let summary = llm
            .complete(&prompts::summarization_prompt(body), max_tokens)
            .await
            .into_text();
        summaries.push(format!("Chapter {position} Summary: {summary}"));
    }
    tracing::info!(
        sections = sections.len(),
        summarized = summaries.len(),
        "Summarized chapters"
    );
    summaries
}
