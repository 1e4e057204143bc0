use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::llm::LlmClient;

/// How many corrected queries the model is asked for, and how many we keep.
pub const MAX_CORRECTIONS: usize = 6;
const MAX_QUERY_CHARS: usize = 100;
const MIN_LINE_CHARS: usize = 2;
const MAX_LINE_CHARS: usize = 49;

/// Leading list markers: "-", "*", "•", "1. ", "2) ", "3 - ". A number only
/// counts as a marker when whitespace follows it, so "15-inch" and "1.5tb"
/// survive.
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*•·]+\s*|\d+[.):](?:\s+|$)|\d+\s+-\s+)").unwrap()
});

const QUOTE_CHARS: &[char] = &['"', '\'', '`', '“', '”', '‘', '’', '«', '»'];

/// Ask the model to correct `query` against product terms the index knows.
pub async fn correct_spelling(
    llm: &dyn LlmClient,
    query: &str,
    context_terms: &[String],
) -> Result<Vec<String>> {
    let instructions = build_instructions(context_terms);
    let input = sanitize_for_prompt(query);
    let raw = llm.complete(&instructions, &input).await?;
    parse_suggestion_lines(&raw)
}

fn build_instructions(context_terms: &[String]) -> String {
    let terms: Vec<String> = context_terms
        .iter()
        .map(|t| sanitize_for_prompt(t))
        .collect();
    format!(
        "You correct misspelled search queries for an electronics store.\n\
         Product names sold in the store: {}\n\
         Using those names as the reference spelling, return {MAX_CORRECTIONS} corrected \
         search queries for the user's input, one per line. \
         No numbering, no quotes, no explanation.",
        terms.join(", ")
    )
}

/// Strip control characters and cap length before text goes into a prompt.
pub fn sanitize_for_prompt(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(MAX_QUERY_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Turn the model's line-delimited answer into suggestions.
///
/// Each line loses its list marker and surrounding quotes; lines that end in
/// ':' (preambles like "Here are some options:") are dropped, as are lines
/// outside 2–49 chars. At most [`MAX_CORRECTIONS`] lines are kept. An answer
/// with no usable line is [`Error::MalformedLlmOutput`].
pub fn parse_suggestion_lines(content: &str) -> Result<Vec<String>> {
    let lines: Vec<String> = content
        .lines()
        .map(clean_line)
        .filter(|line| !line.ends_with(':'))
        .filter(|line| {
            let n = line.chars().count();
            (MIN_LINE_CHARS..=MAX_LINE_CHARS).contains(&n)
        })
        .take(MAX_CORRECTIONS)
        .collect();

    if lines.is_empty() {
        let preview: String = content.chars().take(80).collect();
        return Err(Error::MalformedLlmOutput(format!(
            "no usable suggestion line in {preview:?}"
        )));
    }
    Ok(lines)
}

fn clean_line(line: &str) -> String {
    let without_marker = LIST_MARKER.replace(line, "");
    without_marker
        .trim()
        .trim_matches(QUOTE_CHARS)
        .trim()
        .to_string()
}
