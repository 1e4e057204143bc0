//! "You may also like" lookups for a product page.

use std::sync::Arc;

use crate::cache::Cache;
use crate::error::Result;
use crate::models::{ProductDocument, ProductQuery};
use crate::search::query::escape_filter_value;
use crate::search::SearchIndex;

/// Related products for a handle, cached per handle.
pub struct RelatedProducts {
    index: Arc<dyn SearchIndex>,
    cache: Arc<dyn Cache<Vec<ProductDocument>>>,
    limit: usize,
}

impl RelatedProducts {
    pub fn new(
        index: Arc<dyn SearchIndex>,
        cache: Arc<dyn Cache<Vec<ProductDocument>>>,
        limit: usize,
    ) -> Self {
        Self {
            index,
            cache,
            limit,
        }
    }

    /// None when no product has this handle. Index failures give an empty
    /// list, which is not cached.
    pub async fn related(&self, handle: &str) -> Option<Vec<ProductDocument>> {
        if let Some(cached) = self.cache.get(handle).await {
            return Some(cached);
        }

        let source = match self.find_by_handle(handle).await {
            Ok(Some(doc)) => doc,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Related lookup for {handle:?} failed: {e}");
                return Some(Vec::new());
            }
        };

        match self.lookup_related(&source).await {
            Ok(products) => {
                self.cache.set(handle, products.clone()).await;
                Some(products)
            }
            Err(e) => {
                tracing::warn!("Related lookup for {handle:?} failed: {e}");
                Some(Vec::new())
            }
        }
    }

    async fn find_by_handle(&self, handle: &str) -> Result<Option<ProductDocument>> {
        let mut query = ProductQuery::new("*");
        query.filter_by = Some(format!("handle:={}", escape_filter_value(handle)));
        query.per_page = 1;

        let page = self.index.search_products(&query).await?;
        Ok(page.hits.into_iter().next().map(|h| h.document))
    }

    async fn lookup_related(&self, source: &ProductDocument) -> Result<Vec<ProductDocument>> {
        let Some(query) = related_query(source, self.limit) else {
            return Ok(Vec::new());
        };

        let page = self.index.search_products(&query).await?;
        Ok(page
            .hits
            .into_iter()
            .map(|h| h.document)
            .filter(|d| d.id != source.id)
            .take(self.limit)
            .collect())
    }
}

/// Same product type, else same first collection, else same vendor; never
/// the source itself. Same-vendor products sort first.
fn related_query(source: &ProductDocument, limit: usize) -> Option<ProductQuery> {
    let vendor = source.vendor.as_deref().filter(|v| !v.is_empty());

    let group = if let Some(product_type) = source.product_type.as_deref().filter(|t| !t.is_empty()) {
        format!("product_type:={}", escape_filter_value(product_type))
    } else if let Some(collection) = source.collections.first() {
        format!("collections:=[{}]", escape_filter_value(collection))
    } else if let Some(vendor) = vendor {
        format!("vendor:={}", escape_filter_value(vendor))
    } else {
        return None;
    };

    let mut query = ProductQuery::new("*");
    query.filter_by = Some(format!(
        "{group} && id:!={}",
        escape_filter_value(&source.id)
    ));
    query.sort_by = Some(match vendor {
        Some(vendor) => format!("_eval(vendor:={}):desc,price:desc", escape_filter_value(vendor)),
        None => "price:desc".to_string(),
    });
    query.per_page = (limit + 1) as u32;
    Some(query)
}
