use crate::admin::{AdminClientFactory, MountTableAdmin};
use async_trait::async_trait;
use mountsync_common::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Cache of reusable per-address admin clients, as the coordinator sees it.
///
/// The cache exclusively owns client lifecycle: it creates clients through
/// its factory and closes them by dropping the last reference. Callers only
/// ever look clients up or request invalidation by key. All operations must
/// be safe under concurrent `get_or_create` / `invalidate` / `cleanup`.
#[async_trait]
pub trait AdminClientCache: Send + Sync {
    /// Returns the cached client for the address, creating one if absent.
    async fn get_or_create(&self, address: &str) -> Result<Arc<dyn MountTableAdmin>>;

    /// Removes the client for the address so the next cycle builds a fresh
    /// one. No-op if the address is absent; never errors.
    async fn invalidate(&self, address: &str);

    /// Sweeps out every client idle longer than its max lifetime.
    async fn cleanup(&self);

    /// Drops every cached client, used at service stop.
    async fn clear(&self);
}

struct CacheEntry {
    handle: Arc<dyn MountTableAdmin>,
    last_used: Instant,
}

/// Default [`AdminClientCache`] over a mutex-guarded map.
///
/// Admin clients are created lazily through the injected factory and
/// expire after `max_live` without use. `get_or_create` refreshes the
/// entry's `last_used` so active clients survive the periodic sweep.
pub struct ClientCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    factory: Arc<dyn AdminClientFactory>,
    max_live: Duration,
}

impl ClientCache {
    pub fn new(factory: Arc<dyn AdminClientFactory>, max_live: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            factory,
            max_live,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    pub async fn contains(&self, address: &str) -> bool {
        self.entries.lock().await.contains_key(address)
    }
}

#[async_trait]
impl AdminClientCache for ClientCache {
    async fn get_or_create(&self, address: &str) -> Result<Arc<dyn MountTableAdmin>> {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(address) {
            entry.last_used = Instant::now();
            return Ok(entry.handle.clone());
        }

        let handle = self.factory.create(address)?;
        debug!("Created admin client for {}", address);
        entries.insert(
            address.to_string(),
            CacheEntry {
                handle: handle.clone(),
                last_used: Instant::now(),
            },
        );
        Ok(handle)
    }

    async fn invalidate(&self, address: &str) {
        let mut entries = self.entries.lock().await;
        if entries.remove(address).is_some() {
            debug!("Invalidated admin client for {}", address);
        }
    }

    async fn cleanup(&self) {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.last_used.elapsed() <= self.max_live);
        let expired = before - entries.len();
        if expired > 0 {
            debug!("Expired {} idle admin client(s)", expired);
        }
    }

    async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        let dropped = entries.len();
        entries.clear();
        if dropped > 0 {
            debug!("Closed {} admin client(s)", dropped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoopAdmin;

    #[async_trait]
    impl MountTableAdmin for NoopAdmin {
        async fn refresh(&self) -> Result<bool> {
            Ok(true)
        }
    }

    struct CountingFactory {
        created: AtomicUsize,
    }

    impl CountingFactory {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                created: AtomicUsize::new(0),
            })
        }

        fn created(&self) -> usize {
            self.created.load(Ordering::SeqCst)
        }
    }

    impl AdminClientFactory for CountingFactory {
        fn create(&self, _address: &str) -> Result<Arc<dyn MountTableAdmin>> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NoopAdmin))
        }
    }

    #[tokio::test]
    async fn test_lazy_creation_and_reuse() {
        let factory = CountingFactory::new();
        let cache = ClientCache::new(factory.clone(), Duration::from_secs(60));

        assert_eq!(cache.len().await, 0);
        cache.get_or_create("node1:9001").await.unwrap();
        cache.get_or_create("node1:9001").await.unwrap();
        assert_eq!(factory.created(), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalidate_then_recreate() {
        let factory = CountingFactory::new();
        let cache = ClientCache::new(factory.clone(), Duration::from_secs(60));

        cache.get_or_create("node1:9001").await.unwrap();
        cache.invalidate("node1:9001").await;
        assert!(!cache.contains("node1:9001").await);

        cache.get_or_create("node1:9001").await.unwrap();
        assert_eq!(factory.created(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_absent_is_noop() {
        let factory = CountingFactory::new();
        let cache = ClientCache::new(factory, Duration::from_secs(60));
        cache.invalidate("never-seen:9001").await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_expires_only_idle_entries() {
        let factory = CountingFactory::new();
        let cache = ClientCache::new(factory, Duration::from_millis(50));

        cache.get_or_create("stale:9001").await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        // Touching an entry resets its idle clock
        cache.get_or_create("fresh:9001").await.unwrap();

        cache.cleanup().await;
        assert!(!cache.contains("stale:9001").await);
        assert!(cache.contains("fresh:9001").await);
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let factory = CountingFactory::new();
        let cache = ClientCache::new(factory, Duration::from_secs(60));

        cache.get_or_create("node1:9001").await.unwrap();
        cache.get_or_create("node2:9001").await.unwrap();
        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_get_invalidate_cleanup() {
        let factory = CountingFactory::new();
        let cache = Arc::new(ClientCache::new(factory, Duration::from_secs(60)));

        let mut handles = Vec::new();
        for i in 0..32 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let address = format!("node{}:9001", i % 4);
                cache.get_or_create(&address).await.unwrap();
                if i % 3 == 0 {
                    cache.invalidate(&address).await;
                }
                cache.cleanup().await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
    }
}
