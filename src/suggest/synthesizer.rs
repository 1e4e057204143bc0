use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::llm::spell_correct::correct_spelling;
use crate::llm::LlmClient;
use crate::models::CandidateTerm;
use crate::search::query::normalize;
use crate::search::SearchIndex;
use crate::suggest::similarity;
use crate::suggest::terms::{extract_terms, title_prefix};

pub const MAX_SUGGESTIONS: usize = 6;
const CANDIDATE_LOOKUP_SIZE: u32 = 12;
const FIRST_LETTER_LOOKUP_SIZE: u32 = 4;
const FAST_PATH_MIN_SCORE: f64 = 40.0;
const FAST_PATH_MIN_MATCHES: usize = 2;
const MAX_CONTEXT_TERMS: usize = 6;
const MIN_CONTEXT_TERM_CHARS: usize = 3;

/// Builds "did you mean" suggestions for a query.
///
/// Cheap path first: harvest terms from a loose index lookup and return them
/// when at least two are clearly close to the query. Only when that fails is
/// the LLM asked to correct the query, with the harvested terms as context.
pub struct SuggestionSynthesizer {
    index: Arc<dyn SearchIndex>,
    llm: Option<Arc<dyn LlmClient>>,
}

impl SuggestionSynthesizer {
    pub fn new(index: Arc<dyn SearchIndex>, llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { index, llm }
    }

    /// Up to six suggestions, best first. Never fails: any error, or
    /// cancellation of `cancel`, yields an empty list.
    pub async fn suggest(&self, query: &str, cancel: &CancellationToken) -> Vec<String> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Suggestion request for {query:?} cancelled");
                Vec::new()
            }
            result = self.try_suggest(query) => match result {
                Ok(suggestions) => suggestions,
                Err(e) => {
                    tracing::warn!("Suggestions unavailable for {query:?}: {e}");
                    Vec::new()
                }
            },
        }
    }

    async fn try_suggest(&self, query: &str) -> Result<Vec<String>> {
        let normalized = normalize(query);

        let documents = self
            .index
            .search_candidates(query, CANDIDATE_LOOKUP_SIZE)
            .await?;
        let mut candidates = extract_terms(&documents, query);
        sort_by_score(&mut candidates);

        // ── Fast path: enough strong index matches ──────────
        let strong: Vec<&CandidateTerm> = candidates
            .iter()
            .filter(|c| c.score > FAST_PATH_MIN_SCORE)
            .collect();
        if strong.len() >= FAST_PATH_MIN_MATCHES {
            tracing::debug!("Fast path for {query:?}: {} strong candidates", strong.len());
            return Ok(rank_and_dedup(
                strong.into_iter().map(|c| (c.term.clone(), c.score)),
                &normalized,
            ));
        }

        let top_candidates =
            || rank_and_dedup(candidates.iter().map(|c| (c.term.clone(), c.score)), &normalized);

        let Some(llm) = self.llm.as_deref() else {
            return Ok(top_candidates());
        };

        // ── LLM-assisted path ───────────────────────────────
        let mut context: Vec<String> = candidates
            .iter()
            .filter(|c| c.term.chars().count() >= MIN_CONTEXT_TERM_CHARS)
            .take(MAX_CONTEXT_TERMS)
            .map(|c| c.term.clone())
            .collect();
        if context.is_empty() {
            context = self.first_letter_context(query).await;
        }
        if context.is_empty() {
            return Ok(top_candidates());
        }

        tracing::debug!("LLM path for {query:?} with {} context terms", context.len());
        let corrections = match correct_spelling(llm, query, &context).await {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!("Spelling correction failed for {query:?}, using index terms: {e}");
                return Ok(top_candidates());
            }
        };

        // LLM suggestions go first so they win score ties.
        let merged = corrections
            .into_iter()
            .map(|s| {
                let score = similarity::score(&s, query);
                (s, score)
            })
            .chain(candidates.iter().map(|c| (c.term.clone(), c.score)));

        Ok(rank_and_dedup(merged, &normalized))
    }

    /// Two-word title prefixes from a prefix lookup on the query's first
    /// character. Used when the main lookup produced nothing usable as context.
    async fn first_letter_context(&self, query: &str) -> Vec<String> {
        let Some(first) = query.chars().next() else {
            return Vec::new();
        };

        let documents = match self
            .index
            .search_candidates(&first.to_string(), FIRST_LETTER_LOOKUP_SIZE)
            .await
        {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!("First-letter lookup failed for {query:?}: {e}");
                return Vec::new();
            }
        };

        let mut context: Vec<String> = Vec::new();
        for prefix in documents
            .iter()
            .take(FIRST_LETTER_LOOKUP_SIZE as usize)
            .filter_map(|d| title_prefix(&d.title, 2))
        {
            if !context.contains(&prefix) {
                context.push(prefix);
            }
        }
        context
    }
}

/// Stable descending sort: equal scores keep their encounter order.
fn sort_by_score(candidates: &mut [CandidateTerm]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Sort by score (stable), drop case-insensitive duplicates and the query
/// itself, keep the first [`MAX_SUGGESTIONS`].
fn rank_and_dedup(items: impl Iterator<Item = (String, f64)>, normalized_query: &str) -> Vec<String> {
    let mut items: Vec<(String, f64)> = items.collect();
    items.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|(s, _)| s)
        .filter(|s| normalize(s) != normalized_query)
        .filter(|s| seen.insert(s.to_lowercase()))
        .take(MAX_SUGGESTIONS)
        .collect()
}
