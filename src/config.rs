use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// Search index (Typesense) connection
    pub typesense: TypesenseConfig,
    /// LLM provider used for spelling suggestions
    pub llm: LlmConfig,
    /// Related-products lookup
    pub related: RelatedConfig,
    /// Hard deadline for the whole suggestion path, in milliseconds
    pub suggest_timeout_ms: u64,
    /// Request timeout applied to every outbound HTTP call
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypesenseConfig {
    /// Base URL, e.g. "http://localhost:8108"
    pub base_url: String,
    /// Search-only API key
    pub api_key: String,
    /// Collection holding the product documents
    pub collection: String,
}

impl Default for TypesenseConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8108".to_string(),
            api_key: String::new(),
            collection: "products".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai", "ollama" or "none"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for spelling correction
    pub chat_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Output token cap for a single correction call
    pub max_output_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "none".to_string(),
            base_url: "https://api.openai.com".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            api_key: None,
            max_output_tokens: 60,
        }
    }
}

impl LlmConfig {
    pub fn is_enabled(&self) -> bool {
        matches!(self.provider.as_str(), "openai" | "ollama")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedConfig {
    /// How long a computed related-products list stays fresh
    pub cache_ttl_secs: u64,
    /// Upper bound on cached handles
    pub cache_max_entries: u64,
    /// Maximum number of related products returned
    pub limit: usize,
}

impl Default for RelatedConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3600,
            cache_max_entries: 10_000,
            limit: 8,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9000".to_string(),
            typesense: TypesenseConfig::default(),
            llm: LlmConfig::default(),
            related: RelatedConfig::default(),
            suggest_timeout_ms: 1800,
            http_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("STOREFRONT_SEARCH_BIND_ADDR") {
            config.bind_addr = addr;
        }

        // Search index
        if let Ok(url) = std::env::var("TYPESENSE_URL") {
            config.typesense.base_url = url;
        }
        if let Ok(key) = std::env::var("TYPESENSE_API_KEY") {
            config.typesense.api_key = key;
        }
        if let Ok(collection) = std::env::var("TYPESENSE_COLLECTION") {
            config.typesense.collection = collection;
        }

        // LLM
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(val) = std::env::var("LLM_MAX_OUTPUT_TOKENS") {
            if let Ok(v) = val.parse::<u32>() {
                config.llm.max_output_tokens = v.min(200);
            }
        }

        if let Ok(val) = std::env::var("SUGGEST_TIMEOUT_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.suggest_timeout_ms = v.min(5000);
            }
        }
        if let Ok(val) = std::env::var("HTTP_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.http_timeout_secs = v.max(1);
            }
        }

        // Related products
        if let Ok(val) = std::env::var("RELATED_CACHE_TTL_SECS") {
            if let Ok(v) = val.parse() {
                config.related.cache_ttl_secs = v;
            }
        }
        if let Ok(val) = std::env::var("RELATED_CACHE_MAX_ENTRIES") {
            if let Ok(v) = val.parse() {
                config.related.cache_max_entries = v;
            }
        }
        if let Ok(val) = std::env::var("RELATED_LIMIT") {
            if let Ok(v) = val.parse() {
                config.related.limit = v;
            }
        }

        config
    }

    pub fn suggest_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.suggest_timeout_ms)
    }
}
