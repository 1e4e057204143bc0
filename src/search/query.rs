//! Query-string shaping for the primary search.

use crate::models::{DEFAULT_PER_PAGE, MAX_PER_PAGE};

/// Append a `<n>gb` sibling after every all-digit token, so memory-size
/// shorthand ("16 pro") also matches "16GB" variants. Token order is kept.
pub fn expand_numeric_tokens(query: &str) -> String {
    let mut tokens = Vec::new();
    for token in query.split_whitespace() {
        tokens.push(token.to_string());
        if token.chars().all(|c| c.is_ascii_digit()) {
            tokens.push(format!("{token}gb"));
        }
    }
    tokens.join(" ")
}

/// Trimmed, case-folded form used to compare suggestions with the query.
pub fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Build a Typesense `filter_by` expression from the route's optional filters.
pub fn build_filter(collection: Option<&str>, available: Option<bool>) -> Option<String> {
    let mut clauses = Vec::new();
    if let Some(handle) = collection.map(str::trim).filter(|h| !h.is_empty()) {
        clauses.push(format!("collections:=[{}]", escape_filter_value(handle)));
    }
    if let Some(available) = available {
        clauses.push(format!("available:={available}"));
    }
    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join(" && "))
    }
}

/// Wrap a value in backticks so commas and operators inside it are literal.
pub fn escape_filter_value(value: &str) -> String {
    format!("`{}`", value.replace('`', ""))
}

/// Clamp 1-based pagination to sane bounds.
pub fn page_bounds(page: Option<u32>, per_page: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    (page, per_page)
}
