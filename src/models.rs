use serde::{Deserialize, Serialize};

/// A searchable product record as stored in the index.
///
/// Documents are written by the catalog indexing webhook; this service only
/// reads them, so everything but `id` and `title` is optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDocument {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub sku: Vec<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Handles of the collections the product belongs to
    #[serde(default)]
    pub collections: Vec<String>,
}

/// A matched field fragment returned alongside a hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Highlight {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snippets: Vec<String>,
}

/// A product document plus per-query relevance metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub document: ProductDocument,
    #[serde(default)]
    pub text_match: u64,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
}

/// One page of primary search results
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    pub found: u64,
}

/// Input to the primary product lookup
#[derive(Debug, Clone)]
pub struct ProductQuery {
    pub q: String,
    pub filter_by: Option<String>,
    /// Overrides the default relevance sort
    pub sort_by: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl ProductQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            filter_by: None,
            sort_by: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

pub const DEFAULT_PER_PAGE: u32 = 24;
pub const MAX_PER_PAGE: u32 = 100;

/// Where a candidate correction term was harvested from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TermSource {
    FullTitle,
    TitleStart,
    Word,
    Vendor,
}

/// A possible corrected query, scored against what the user typed
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CandidateTerm {
    pub term: String,
    pub source: TermSource,
    pub score: f64,
}

/// Query string of `GET /api/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub page: Option<u32>,
    #[serde(alias = "perPage")]
    pub per_page: Option<u32>,
    /// Restrict to one collection handle
    pub collection: Option<String>,
    /// Restrict by availability
    pub available: Option<bool>,
}

/// Search response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub found: u64,
    pub page: u32,
    pub per_page: u32,
    pub suggestions: Vec<String>,
}

/// Query string of `GET /api/suggest`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub q: String,
}

/// Suggest-only response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestResponse {
    pub query: String,
    pub suggestions: Vec<String>,
}

/// Related-products response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedResponse {
    pub handle: String,
    pub products: Vec<ProductDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_deserializes_with_missing_optional_fields() {
        let doc: ProductDocument =
            serde_json::from_str(r#"{"id": "1", "title": "Apple iPhone 15 Pro"}"#).unwrap();
        assert_eq!(doc.title, "Apple iPhone 15 Pro");
        assert!(doc.sku.is_empty());
        assert_eq!(doc.vendor, None);
        assert!(!doc.available);
    }

    #[test]
    fn test_search_response_uses_camel_case() {
        let resp = SearchResponse {
            hits: vec![],
            found: 0,
            page: 1,
            per_page: 24,
            suggestions: vec![],
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["perPage"], 24);
        assert!(json.get("per_page").is_none());
    }

    #[test]
    fn test_search_params_accept_per_page_alias() {
        let params: SearchParams = serde_json::from_str(r#"{"q": "tv", "perPage": 10}"#).unwrap();
        assert_eq!(params.per_page, Some(10));
    }

    #[test]
    fn test_term_source_serializes_to_snake_case() {
        let json = serde_json::to_value(TermSource::TitleStart).unwrap();
        assert_eq!(json, "title_start");
    }
}
