//! Cache store contract.
//!
//! The pipeline treats the cache as an opaque byte store keyed by
//! string, with optional sliding expiration and no transactional
//! guarantees. [`MemoryCache`] is the in-crate implementation.

pub mod memory;

use crate::core::Result;
use async_trait::async_trait;
use std::time::Duration;

pub use memory::MemoryCache;

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`. With a sliding expiration, every
    /// read pushes the entry's eviction deadline forward.
    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        sliding_expiration: Option<Duration>,
    ) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}
