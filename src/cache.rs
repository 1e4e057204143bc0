//! Process-local TTL cache, injected into the components that need one.

use async_trait::async_trait;
use std::time::Duration;

/// Key-value cache abstraction so components can take a test double.
#[async_trait]
pub trait Cache<V>: Send + Sync {
    async fn get(&self, key: &str) -> Option<V>;
    async fn set(&self, key: &str, value: V);
}

/// Moka-backed cache where every entry expires `ttl` after insertion.
///
/// Concurrent misses are not coalesced; both callers recompute and the last
/// write wins.
pub struct TtlCache<V> {
    entries: moka::future::Cache<String, V>,
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let entries = moka::future::Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { entries }
    }

    /// Approximate entry count; pending evictions are applied first.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

#[async_trait]
impl<V: Clone + Send + Sync + 'static> Cache<V> for TtlCache<V> {
    async fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).await
    }

    async fn set(&self, key: &str, value: V) {
        self.entries.insert(key.to_string(), value).await;
    }
}
