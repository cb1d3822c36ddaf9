use super::CacheStore;
use crate::core::Result;
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct CacheSlot {
    value: Vec<u8>,
    expires_at: Option<Instant>,
    sliding: Option<Duration>,
}

/// In-memory byte cache with LRU eviction and sliding expiration.
pub struct MemoryCache {
    slots: Mutex<LruCache<String, CacheSlot>>,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            slots: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.lock().await.is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut slots = self.slots.lock().await;
        let Some(slot) = slots.get_mut(key) else {
            return Ok(None);
        };
        if let Some(expires_at) = slot.expires_at {
            if Instant::now() >= expires_at {
                slots.pop(key);
                return Ok(None);
            }
        }
        // Sliding expiration: a hit pushes the deadline forward.
        if let Some(window) = slot.sliding {
            slot.expires_at = Some(Instant::now() + window);
        }
        Ok(Some(slot.value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        sliding_expiration: Option<Duration>,
    ) -> Result<()> {
        let mut slots = self.slots.lock().await;
        slots.put(
            key.to_string(),
            CacheSlot {
                value,
                expires_at: sliding_expiration.map(|window| Instant::now() + window),
                sliding: sliding_expiration,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut slots = self.slots.lock().await;
        slots.pop(key);
        Ok(())
    }
}
