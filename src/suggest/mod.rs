//! Query suggestions: lexical scoring, term harvesting, and the fast-path /
//! LLM-assisted synthesizer that combines them.

pub mod similarity;
pub mod synthesizer;
pub mod terms;

pub use synthesizer::{SuggestionSynthesizer, MAX_SUGGESTIONS};
