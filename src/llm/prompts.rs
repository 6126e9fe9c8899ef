//! Prompt templates for the three completion shapes the pipeline needs.
//!
//! The schema prompt must keep asking for a bare JSON list of strings: the tabular stage parses
//! the response with `serde_json` and only applies it when that succeeds.

/// Ask for column headers for rows that have none.
///
/// `sample_rows` is the JSON rendering of the sampled rows (an array of arrays).
pub fn schema_inference_prompt(sample_rows: &str) -> String {
    format!(
        "The following data rows do not have headers:\n{sample_rows}\n\n\
         Suggest likely column headers (one per column), and return ONLY a JSON list of strings.\n\
         For example: [\"ID\", \"Name\", \"Date\", \"Amount\"].\n"
    )
}

/// Ask for a concise, high-level summary of `text`.
pub fn summarization_prompt(text: &str) -> String {
    format!("Summarize the following text in a concise, high-level manner:\n{text}\n")
}

/// Ask for a high-level analysis of a small CSV sample.
pub fn insight_prompt(sample_csv: &str) -> String {
    format!(
        "Below is a sample of tabular data (up to 5 rows). Provide a high-level analysis:\n\
         {sample_csv}\n\
         Potential areas to address:\n\
         - Data categories\n\
         - Trends or anomalies\n\
         - Potential relationships\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_prompt_demands_json_list() {
        let prompt = schema_inference_prompt(r#"[[1,"alice"]]"#);
        assert!(prompt.contains(r#"[[1,"alice"]]"#));
        assert!(prompt.contains("return ONLY a JSON list of strings"));
    }

    #[test]
    fn insight_prompt_embeds_sample() {
        let prompt = insight_prompt("0,1\n1,alice\n");
        assert!(prompt.contains("0,1\n1,alice\n"));
        assert!(prompt.contains("Trends or anomalies"));
    }
}
