use std::sync::Arc;
use std::time::Duration;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::llm::client::HttpLlmClient;
use crate::llm::LlmClient;
use crate::models::ProductDocument;
use crate::recommend::RelatedProducts;
use crate::search::typesense::TypesenseClient;
use crate::search::SearchIndex;
use crate::suggest::SuggestionSynthesizer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub index: Arc<dyn SearchIndex>,
    pub suggestions: Arc<SuggestionSynthesizer>,
    pub related: Arc<RelatedProducts>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(3))
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let index: Arc<dyn SearchIndex> = Arc::new(TypesenseClient::new(
            http_client.clone(),
            config.typesense.clone(),
        ));
        let llm = HttpLlmClient::from_config(http_client, config.llm.clone())
            .map(|client| Arc::new(client) as Arc<dyn LlmClient>);

        Ok(Self::with_components(config, index, llm))
    }

    /// Wire the service around explicit collaborators.
    pub fn with_components(
        config: Config,
        index: Arc<dyn SearchIndex>,
        llm: Option<Arc<dyn LlmClient>>,
    ) -> Self {
        let related_cache: Arc<TtlCache<Vec<ProductDocument>>> = Arc::new(TtlCache::new(
            Duration::from_secs(config.related.cache_ttl_secs),
            config.related.cache_max_entries,
        ));
        let related = RelatedProducts::new(index.clone(), related_cache, config.related.limit);
        let suggestions = SuggestionSynthesizer::new(index.clone(), llm);

        Self {
            config,
            index,
            suggestions: Arc::new(suggestions),
            related: Arc::new(related),
        }
    }
}
