use thiserror::Error;

/// Failures at the seams between the search, suggestion and LLM components.
///
/// None of these ever reach the client: the primary search degrades to an
/// empty result set and the suggestion path to an empty list.
#[derive(Debug, Error)]
pub enum Error {
    /// The search index is unreachable, answered with an error status, or
    /// returned a body we could not decode.
    #[error("search index unavailable: {0}")]
    SearchUnavailable(String),

    /// The LLM call failed or its response was cut short.
    #[error("suggestions unavailable: {0}")]
    SuggestionUnavailable(String),

    /// The LLM answered, but nothing in the answer was a usable suggestion line.
    #[error("malformed LLM output: {0}")]
    MalformedLlmOutput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
