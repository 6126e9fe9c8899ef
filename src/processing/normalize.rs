//! Text normalization ahead of summarization.

/// Collapse carriage returns and newlines into spaces and trim the result.
pub fn normalize_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let cleaned = raw.replace(['\r', '\n'], " ").trim().to_string();
    tracing::debug!(length = char_len(&cleaned), "Normalized text");
    cleaned
}

/// Length in characters, not bytes.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Number of newline characters plus one.
pub fn line_count(raw: &str) -> usize {
    raw.matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newlines_become_spaces() {
        assert_eq!(normalize_text("  a\r\nb\nc  \n"), "a  b c");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn counts_characters_and_lines() {
        assert_eq!(char_len("héllo"), 5);
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("one\ntwo\n"), 3);
    }
}
