//! Chapter segmentation by heading detection.
//!
//! Headings are found syntactically: a line starting with `chapter` (any case), whitespace, and
//! digits. Body text that happens to start a line that way also splits.

use regex::Regex;
use std::sync::LazyLock;

static CHAPTER_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^chapter\s+\d+").expect("chapter heading pattern"));

/// Split `text` at chapter headings.
///
/// The headings themselves are dropped. The first section is whatever precedes the first
/// heading, possibly empty. Without any heading the result is `[text]`, which callers read as
/// "no chapters detected".
pub fn segment(text: &str) -> Vec<String> {
    let sections: Vec<String> = CHAPTER_HEADING.split(text).map(str::to_string).collect();
    tracing::debug!(sections = sections.len(), "Segmented text");
    sections
}
