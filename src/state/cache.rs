use crate::error::Result;
use crate::models::CacheEntry;
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};

/// Storage behind the search result cache
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    async fn insert(&self, key: String, entry: CacheEntry) -> Result<()>;

    async fn invalidate(&self, key: &str) -> Result<()>;

    /// Exact number of live entries
    async fn entry_count(&self) -> u64;
}

/// Expires every entry after its own TTL
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(Duration::from_secs(value.ttl_secs))
    }
}

/// Cache backend using Moka
#[derive(Clone)]
pub struct MokaCacheBackend {
    cache: Cache<String, CacheEntry>,
}

impl MokaCacheBackend {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryTtl)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl CacheBackend for MokaCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.cache.get(key).await)
    }

    async fn insert(&self, key: String, entry: CacheEntry) -> Result<()> {
        self.cache.insert(key, entry).await;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchMetadata;
    use chrono::Utc;

    fn entry(ttl_secs: u64) -> CacheEntry {
        CacheEntry {
            fingerprint: "key".to_string(),
            results: vec![],
            cached_at: Utc::now(),
            ttl_secs,
            metadata: SearchMetadata::default(),
        }
    }

    #[tokio::test]
    async fn test_cache_basic_operations() {
        let cache = MokaCacheBackend::new(100);

        cache.insert("key1".to_string(), entry(60)).await.unwrap();
        assert!(cache.get("key1").await.unwrap().is_some());

        cache.invalidate("key1").await.unwrap();
        assert!(cache.get("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entry_count_is_exact() {
        let cache = MokaCacheBackend::new(100);
        cache.insert("key1".to_string(), entry(60)).await.unwrap();
        cache.insert("key1".to_string(), entry(60)).await.unwrap();
        cache.insert("key2".to_string(), entry(60)).await.unwrap();

        assert_eq!(cache.entry_count().await, 2);
    }

    #[tokio::test]
    async fn test_entries_expire_after_their_own_ttl() {
        let cache = MokaCacheBackend::new(100);

        cache.insert("short".to_string(), entry(1)).await.unwrap();
        cache.insert("long".to_string(), entry(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(1200)).await;

        assert!(cache.get("short").await.unwrap().is_none());
        assert!(cache.get("long").await.unwrap().is_some());
    }
}
