// --- File: crates/services/careline_backend/src/cache.rs ---
//! Short-lived key/value cache for read-mostly lookups.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[async_trait]
pub trait KeyValueCache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// The cached value, unless it is missing or expired.
    async fn get(&self, key: &str) -> Option<V>;

    async fn insert(&self, key: String, value: V);

    async fn invalidate(&self, key: &str);
}

/// A map of entries that expire a fixed time after insertion.
pub struct InMemoryCache<V> {
    entries: RwLock<HashMap<String, (V, Instant)>>,
    ttl: Duration,
}

impl<V> InMemoryCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[async_trait]
impl<V> KeyValueCache<V> for InMemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, expires_at)) if Instant::now() < *expires_at => {
                    return Some(value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop it unless another writer refreshed it meanwhile.
        let mut entries = self.entries.write().await;
        if let Some((_, expires_at)) = entries.get(key) {
            if Instant::now() >= *expires_at {
                entries.remove(key);
            }
        }
        None
    }

    /// Also sweeps out every expired entry.
    async fn insert(&self, key: String, value: V) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key, (value, now + self.ttl));
    }

    async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}
