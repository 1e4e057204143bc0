use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::TypesenseConfig;
use crate::error::Error;
use crate::models::{ProductDocument, ProductQuery, SearchHit, SearchPage};
use crate::search::SearchIndex;

const DEFAULT_SORT: &str = "_text_match:desc,price:desc";

/// `SearchIndex` backed by a Typesense collection.
pub struct TypesenseClient {
    client: reqwest::Client,
    config: TypesenseConfig,
}

impl TypesenseClient {
    pub fn new(client: reqwest::Client, config: TypesenseConfig) -> Self {
        Self { client, config }
    }

    async fn search(&self, params: &SearchRequestParams<'_>) -> Result<TypesenseSearchResponse> {
        let url = format!(
            "{}/collections/{}/documents/search",
            self.config.base_url.trim_end_matches('/'),
            self.config.collection
        );

        let resp = self
            .client
            .get(&url)
            .header("X-TYPESENSE-API-KEY", &self.config.api_key)
            .query(params)
            .send()
            .await
            .context("Failed to reach Typesense")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Typesense returned {status}: {body}");
        }

        resp.json()
            .await
            .context("Failed to parse Typesense search response")
    }
}

#[async_trait]
impl SearchIndex for TypesenseClient {
    async fn search_products(&self, query: &ProductQuery) -> crate::error::Result<SearchPage> {
        let params = product_params(query);
        let body = self.search(&params).await.map_err(unavailable)?;
        Ok(SearchPage {
            hits: body.hits,
            found: body.found,
        })
    }

    async fn search_candidates(
        &self,
        query: &str,
        per_page: u32,
    ) -> crate::error::Result<Vec<ProductDocument>> {
        let params = candidate_params(query, per_page);
        let body = self.search(&params).await.map_err(unavailable)?;
        Ok(body.hits.into_iter().map(|h| h.document).collect())
    }
}

fn unavailable(e: anyhow::Error) -> Error {
    Error::SearchUnavailable(format!("{e:#}"))
}

// ─── Query parameters ───────────────────────────────────

/// Typesense search parameters; serialized into the query string.
#[derive(Debug, Serialize)]
pub(crate) struct SearchRequestParams<'a> {
    q: &'a str,
    query_by: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    query_by_weights: Option<&'static str>,
    num_typos: &'static str,
    min_len_1typo: u32,
    min_len_2typo: u32,
    prefix: &'static str,
    infix: &'static str,
    drop_tokens_threshold: u32,
    typo_tokens_threshold: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    exhaustive_search: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prioritize_exact_match: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prioritize_token_position: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_typos_for_numerical_tokens: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_typos_for_alpha_numerical_tokens: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort_by: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_by: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_fields: Option<&'static str>,
    page: u32,
    per_page: u32,
}

/// Relevance-tuned parameters for the primary search.
///
/// Title and SKU outweigh handle and tags. SKUs take no typos, and typos are
/// off for numerical and alphanumerical tokens ("15", "s24") so model numbers
/// don't drift. Ties on text match go to the pricier product.
pub(crate) fn product_params(query: &ProductQuery) -> SearchRequestParams<'_> {
    SearchRequestParams {
        q: &query.q,
        query_by: "title,sku,handle,tags",
        query_by_weights: Some("10,10,4,2"),
        num_typos: "2,0,1,1",
        min_len_1typo: 4,
        min_len_2typo: 7,
        prefix: "true,true,true,false",
        infix: "fallback,fallback,off,off",
        drop_tokens_threshold: 1,
        typo_tokens_threshold: 1,
        exhaustive_search: Some(true),
        prioritize_exact_match: Some(true),
        prioritize_token_position: Some(true),
        enable_typos_for_numerical_tokens: Some(false),
        enable_typos_for_alpha_numerical_tokens: Some(false),
        sort_by: Some(query.sort_by.as_deref().unwrap_or(DEFAULT_SORT)),
        filter_by: query.filter_by.as_deref(),
        include_fields: None,
        page: query.page,
        per_page: query.per_page,
    }
}

/// Looser parameters for harvesting suggestion candidates: more typos, infix
/// always on, and no token dropping.
pub(crate) fn candidate_params(q: &str, per_page: u32) -> SearchRequestParams<'_> {
    SearchRequestParams {
        q,
        query_by: "title,vendor,product_type,tags",
        query_by_weights: None,
        num_typos: "2",
        min_len_1typo: 3,
        min_len_2typo: 5,
        prefix: "true",
        infix: "always",
        drop_tokens_threshold: 0,
        typo_tokens_threshold: 0,
        exhaustive_search: None,
        prioritize_exact_match: None,
        prioritize_token_position: None,
        enable_typos_for_numerical_tokens: None,
        enable_typos_for_alpha_numerical_tokens: None,
        sort_by: None,
        filter_by: None,
        include_fields: Some("id,title,handle,vendor,product_type"),
        page: 1,
        per_page,
    }
}

// ─── Response ───────────────────────────────────────────

#[derive(Deserialize)]
struct TypesenseSearchResponse {
    #[serde(default)]
    found: u64,
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_query_map(params: &SearchRequestParams<'_>) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(params).unwrap() {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_product_params_defaults() {
        let query = ProductQuery::new("16 16gb pro");
        let map = to_query_map(&product_params(&query));
        assert_eq!(map["q"], "16 16gb pro");
        assert_eq!(map["query_by"], "title,sku,handle,tags");
        assert_eq!(map["sort_by"], DEFAULT_SORT);
        assert_eq!(map["prioritize_exact_match"], true);
        assert_eq!(map["enable_typos_for_numerical_tokens"], false);
        assert_eq!(map["page"], 1);
        assert!(!map.contains_key("filter_by"));
        assert!(!map.contains_key("include_fields"));
    }

    #[test]
    fn test_product_params_carry_filter_and_sort_override() {
        let mut query = ProductQuery::new("*");
        query.filter_by = Some("available:=true".to_string());
        query.sort_by = Some("price:asc".to_string());
        query.page = 3;
        query.per_page = 10;
        let map = to_query_map(&product_params(&query));
        assert_eq!(map["filter_by"], "available:=true");
        assert_eq!(map["sort_by"], "price:asc");
        assert_eq!(map["page"], 3);
        assert_eq!(map["per_page"], 10);
    }

    #[test]
    fn test_candidate_params_are_loose() {
        let map = to_query_map(&candidate_params("ipone", 12));
        assert_eq!(map["infix"], "always");
        assert_eq!(map["prefix"], "true");
        assert_eq!(map["drop_tokens_threshold"], 0);
        assert_eq!(map["num_typos"], "2");
        assert_eq!(map["per_page"], 12);
        assert!(!map.contains_key("sort_by"));
        assert!(!map.contains_key("query_by_weights"));
    }

    #[test]
    fn test_parse_typesense_response() {
        let body = r#"{
            "found": 1,
            "page": 1,
            "hits": [{
                "document": {"id": "7", "title": "Apple iPhone 15 Pro", "price": 4999.0},
                "text_match": 578730123365187705,
                "highlights": [{"field": "title", "snippet": "Apple <mark>iPhone</mark>", "matched_tokens": ["iPhone"]}]
            }]
        }"#;
        let parsed: TypesenseSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.found, 1);
        assert_eq!(parsed.hits[0].document.title, "Apple iPhone 15 Pro");
        assert_eq!(parsed.hits[0].highlights[0].field, "title");
    }

    #[test]
    fn test_parse_empty_response() {
        let parsed: TypesenseSearchResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.found, 0);
        assert!(parsed.hits.is_empty());
    }
}
