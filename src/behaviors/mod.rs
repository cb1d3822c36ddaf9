//! Cross-cutting pipeline behaviors, one per file.
//!
//! Each behavior probes its capability on the request and calls
//! straight through when the capability is absent. Register them in the
//! order their "before" sections should run.

pub mod authorization;
pub mod cache_removing;
pub mod caching;
pub mod logging;
pub mod performance;

pub use authorization::AuthorizationBehavior;
pub use cache_removing::CacheRemovingBehavior;
pub use caching::CachingBehavior;
pub use logging::LoggingBehavior;
pub use performance::PerformanceBehavior;

use crate::cache::CacheStore;
use crate::core::{AppError, Result};
use std::collections::BTreeSet;
use std::time::Duration;

/// Reads a group's key-set. A corrupt stored set is downgraded to
/// empty with a warning; group bookkeeping must never fail a request
/// that already produced a response.
pub(crate) async fn load_group(cache: &dyn CacheStore, group: &str) -> Result<BTreeSet<String>> {
    match cache.get(group).await? {
        None => Ok(BTreeSet::new()),
        Some(bytes) => match rmp_serde::from_slice(&bytes) {
            Ok(keys) => Ok(keys),
            Err(err) => {
                tracing::warn!(group, error = %err, "corrupt cache group key-set, treating as empty");
                Ok(BTreeSet::new())
            }
        },
    }
}

/// Writes a group's key-set back. Concurrent writers to the same group
/// race last-write-wins; the key-set is not updated atomically.
pub(crate) async fn store_group(
    cache: &dyn CacheStore,
    group: &str,
    keys: &BTreeSet<String>,
    expiration: Option<Duration>,
) -> Result<()> {
    let bytes =
        rmp_serde::to_vec(keys).map_err(|err| AppError::Serialization(err.to_string()))?;
    cache.set(group, bytes, expiration).await
}
