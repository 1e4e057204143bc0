//! LLM access for spelling correction.
//!
//! The provider is an unreliable, cost-limited dependency: every call is
//! short, output-capped, and has a fallback at the call site.

pub mod client;
pub mod spell_correct;

use async_trait::async_trait;

use crate::error::Result;

/// A single instruction + input completion.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the model's free-form text. HTTP failures and truncated
    /// ("incomplete") responses are [`crate::error::Error::SuggestionUnavailable`].
    async fn complete(&self, instructions: &str, input: &str) -> Result<String>;
}
