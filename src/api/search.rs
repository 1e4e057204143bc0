use axum::extract::{Query, State};
use axum::Json;
use tokio_util::sync::CancellationToken;

use crate::models::{
    ProductQuery, SearchPage, SearchParams, SearchResponse, SuggestParams, SuggestResponse,
};
use crate::search::query::{build_filter, expand_numeric_tokens, page_bounds};
use crate::state::AppState;

/// GET /api/search - Instant search:
///   1. Suggestions start in the background on the original query
///   2. Primary search runs on the numerically expanded query
///   3. Suggestions are awaited up to the configured deadline
///
/// Always answers 200; an index outage shows up as zero hits and a slow or
/// failing suggestion path as no suggestions.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    Json(run_search(&state, &params).await)
}

pub async fn run_search(state: &AppState, params: &SearchParams) -> SearchResponse {
    let (page, per_page) = page_bounds(params.page, params.per_page);
    let query = params.q.trim().to_string();
    if query.is_empty() {
        return SearchResponse {
            hits: Vec::new(),
            found: 0,
            page,
            per_page,
            suggestions: Vec::new(),
        };
    }

    // ── Step 1: Suggestions, off the critical path ──────────
    // Dropping this request (client gone) cancels the spawned task.
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();
    let suggestion_task = {
        let synthesizer = state.suggestions.clone();
        let query = query.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { synthesizer.suggest(&query, &cancel).await })
    };

    // ── Step 2: Primary search ──────────────────────────────
    let mut product_query = ProductQuery::new(expand_numeric_tokens(&query));
    product_query.filter_by = build_filter(params.collection.as_deref(), params.available);
    product_query.page = page;
    product_query.per_page = per_page;

    let primary = async {
        match state.index.search_products(&product_query).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Primary search for {query:?} failed: {e}");
                SearchPage::default()
            }
        }
    };

    // ── Step 3: Suggestions, bounded by the deadline ────────
    let deadline = state.config.suggest_timeout();
    let suggestions = async {
        match tokio::time::timeout(deadline, suggestion_task).await {
            Ok(Ok(suggestions)) => suggestions,
            Ok(Err(e)) => {
                tracing::warn!("Suggestion task for {query:?} failed: {e}");
                Vec::new()
            }
            Err(_) => {
                tracing::debug!("Suggestions for {query:?} missed the {deadline:?} deadline");
                cancel.cancel();
                Vec::new()
            }
        }
    };

    let (result, suggestions) = tokio::join!(primary, suggestions);

    SearchResponse {
        hits: result.hits,
        found: result.found,
        page,
        per_page,
        suggestions,
    }
}

/// GET /api/suggest - Suggestions only, for the search-as-you-type dropdown
pub async fn suggest(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Json<SuggestResponse> {
    let query = params.q.trim().to_string();
    let cancel = CancellationToken::new();

    let suggestions = match tokio::time::timeout(
        state.config.suggest_timeout(),
        state.suggestions.suggest(&query, &cancel),
    )
    .await
    {
        Ok(suggestions) => suggestions,
        Err(_) => {
            tracing::debug!("Suggestions for {query:?} timed out");
            Vec::new()
        }
    };

    Json(SuggestResponse { query, suggestions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::Config;
    use crate::error::{Error, Result};
    use crate::llm::LlmClient;
    use crate::models::{ProductDocument, SearchHit};
    use crate::search::SearchIndex;

    fn doc(title: &str) -> ProductDocument {
        ProductDocument {
            id: title.to_string(),
            title: title.to_string(),
            handle: String::new(),
            sku: vec![],
            vendor: None,
            product_type: None,
            tags: vec![],
            price: 0.0,
            available: true,
            image: None,
            url: None,
            collections: vec![],
        }
    }

    #[derive(Default)]
    struct FakeIndex {
        products: Vec<ProductDocument>,
        candidates: Vec<ProductDocument>,
        fail_products: bool,
        fail_candidates: bool,
        slow_candidates: bool,
        product_queries: Mutex<Vec<ProductQuery>>,
        candidate_calls: AtomicUsize,
        candidates_abandoned: AtomicBool,
    }

    /// Flags a lookup that was dropped before it finished.
    struct AbandonGuard<'a> {
        flag: &'a AtomicBool,
        armed: bool,
    }

    impl Drop for AbandonGuard<'_> {
        fn drop(&mut self) {
            if self.armed {
                self.flag.store(true, Ordering::SeqCst);
            }
        }
    }

    #[async_trait]
    impl SearchIndex for FakeIndex {
        async fn search_products(&self, query: &ProductQuery) -> Result<SearchPage> {
            self.product_queries.lock().push(query.clone());
            if self.fail_products {
                return Err(Error::SearchUnavailable("503".to_string()));
            }
            Ok(SearchPage {
                found: self.products.len() as u64,
                hits: self
                    .products
                    .iter()
                    .cloned()
                    .map(|document| SearchHit {
                        document,
                        text_match: 1,
                        highlights: vec![],
                    })
                    .collect(),
            })
        }

        async fn search_candidates(&self, _query: &str, _per_page: u32) -> Result<Vec<ProductDocument>> {
            self.candidate_calls.fetch_add(1, Ordering::SeqCst);
            if self.slow_candidates {
                let mut guard = AbandonGuard {
                    flag: &self.candidates_abandoned,
                    armed: true,
                };
                tokio::time::sleep(Duration::from_secs(30)).await;
                guard.armed = false;
            }
            if self.fail_candidates {
                return Err(Error::SearchUnavailable("503".to_string()));
            }
            Ok(self.candidates.clone())
        }
    }

    /// Never answers within any reasonable deadline.
    struct SlowLlm;

    #[async_trait]
    impl LlmClient for SlowLlm {
        async fn complete(&self, _instructions: &str, _input: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("too late".to_string())
        }
    }

    fn state_with(index: Arc<FakeIndex>, llm: Option<Arc<dyn LlmClient>>) -> AppState {
        let mut config = Config::default();
        config.suggest_timeout_ms = 100;
        AppState::with_components(config, index, llm)
    }

    fn params(q: &str) -> SearchParams {
        SearchParams {
            q: q.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_query_short_circuits() {
        let index = Arc::new(FakeIndex::default());
        let state = state_with(index.clone(), None);

        let resp = run_search(&state, &params("   ")).await;

        assert!(resp.hits.is_empty());
        assert_eq!(resp.found, 0);
        assert!(resp.suggestions.is_empty());
        assert!(index.product_queries.lock().is_empty());
        assert_eq!(index.candidate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_primary_search_uses_expanded_query_and_filters() {
        let index = Arc::new(FakeIndex {
            products: vec![doc("Apple iPhone 16 Pro 256GB")],
            ..Default::default()
        });
        let state = state_with(index.clone(), None);
        let params = SearchParams {
            q: "16 pro".to_string(),
            page: Some(2),
            per_page: Some(10),
            collection: Some("phones".to_string()),
            available: Some(true),
        };

        let resp = run_search(&state, &params).await;

        assert_eq!(resp.found, 1);
        assert_eq!(resp.page, 2);
        assert_eq!(resp.per_page, 10);
        let queries = index.product_queries.lock();
        assert_eq!(queries[0].q, "16 16gb pro");
        assert_eq!(
            queries[0].filter_by.as_deref(),
            Some("collections:=[`phones`] && available:=true")
        );
        assert_eq!(queries[0].page, 2);
    }

    #[tokio::test]
    async fn test_suggestion_failure_keeps_hits() {
        let index = Arc::new(FakeIndex {
            products: vec![doc("Apple iPhone 15 Pro")],
            fail_candidates: true,
            ..Default::default()
        });
        let state = state_with(index.clone(), None);

        let resp = run_search(&state, &params("ipone 15")).await;

        assert_eq!(resp.found, 1);
        assert_eq!(resp.hits.len(), 1);
        assert!(resp.suggestions.is_empty());
        assert_eq!(index.candidate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_primary_failure_keeps_suggestions() {
        let index = Arc::new(FakeIndex {
            candidates: vec![doc("Apple iPhone 15 Pro")],
            fail_products: true,
            ..Default::default()
        });
        let state = state_with(index, None);

        let resp = run_search(&state, &params("ipone 15")).await;

        assert!(resp.hits.is_empty());
        assert_eq!(resp.found, 0);
        assert!(resp.suggestions.iter().any(|s| s.contains("iPhone")));
    }

    #[tokio::test]
    async fn test_slow_llm_misses_deadline_without_blocking_hits() {
        let index = Arc::new(FakeIndex {
            products: vec![doc("Bose QuietComfort")],
            candidates: vec![doc("Bose QuietComfort")],
            ..Default::default()
        });
        let state = state_with(index, Some(Arc::new(SlowLlm)));

        let started = std::time::Instant::now();
        let resp = run_search(&state, &params("zqx")).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(resp.found, 1);
        assert!(resp.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_aborted_request_cancels_inflight_lookup() {
        let index = Arc::new(FakeIndex {
            slow_candidates: true,
            ..Default::default()
        });
        let mut config = Config::default();
        config.suggest_timeout_ms = 5000;
        let state = AppState::with_components(config, index.clone(), None);

        // The client goes away long before the suggestion deadline
        let aborted =
            tokio::time::timeout(Duration::from_millis(50), run_search(&state, &params("ipone"))).await;
        assert!(aborted.is_err());

        for _ in 0..100 {
            if index.candidates_abandoned.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(index.candidate_calls.load(Ordering::SeqCst), 1);
        assert!(index.candidates_abandoned.load(Ordering::SeqCst));
    }
}
