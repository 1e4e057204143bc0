//! Search index access: the `SearchIndex` seam, its Typesense implementation,
//! and query-string helpers for the primary search route.

pub mod query;
pub mod typesense;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ProductDocument, ProductQuery, SearchPage};

/// Typo-tolerant lookups against the product index.
///
/// Every failure comes back as [`crate::error::Error::SearchUnavailable`];
/// callers degrade to empty results instead of failing the request.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Primary, relevance-tuned product search.
    async fn search_products(&self, query: &ProductQuery) -> Result<SearchPage>;

    /// Loose lookup used only to harvest suggestion candidates.
    async fn search_candidates(&self, query: &str, per_page: u32) -> Result<Vec<ProductDocument>>;
}
