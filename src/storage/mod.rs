//! Storage provider contract.
//!
//! The core never talks to a concrete engine; it consumes this trait.
//! [`MemoryStore`] is the in-crate reference implementation and the
//! engine the test suite runs against.

pub mod memory;

use crate::core::{Entity, EntityKey, Result, RowVersion};
use crate::mapping::RelationDescriptor;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::MemoryStore;

/// Currently-persisted concurrency-relevant fields of a row, fetched
/// without replacing any in-memory instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedState {
    pub row_version: RowVersion,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Contract every storage/mapping collaborator must satisfy.
///
/// Reads apply a global soft-delete filter unless `with_deleted` is
/// set. Writes are the only place concurrency tokens change: the store
/// assigns a fresh `RowVersion` on every committed insert/update.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetches one entity by key. Soft-deleted rows are filtered out
    /// unless the caller explicitly opts in.
    async fn fetch(&self, key: &EntityKey, with_deleted: bool) -> Result<Option<Box<dyn Entity>>>;

    /// Peeks at the persisted concurrency state of a row. `None` means
    /// the row is physically gone.
    async fn persisted_state(&self, key: &EntityKey) -> Result<Option<PersistedState>>;

    /// On-demand load of an unloaded relation: the keys of every
    /// instance of `relation.target()` pointing at `parent`. Includes
    /// soft-deleted rows; the cascade's idempotence guard handles them.
    async fn load_relation(
        &self,
        parent: &EntityKey,
        relation: &RelationDescriptor,
    ) -> Result<Vec<EntityKey>>;

    /// Persists a new row. The returned token is the row's initial
    /// version, already stamped onto the stored copy.
    async fn insert(&self, entity: Box<dyn Entity>) -> Result<RowVersion>;

    /// Persists the current state of an existing row and assigns the
    /// row a fresh token. Token *comparison* is not this method's job;
    /// the concurrency guard runs before it.
    async fn update(&self, entity: Box<dyn Entity>) -> Result<RowVersion>;

    /// Physically removes a row. Returns whether it existed.
    async fn remove(&self, key: &EntityKey) -> Result<bool>;

    /// Bulk insert primitive.
    async fn insert_many(&self, entities: Vec<Box<dyn Entity>>) -> Result<()>;

    /// Bulk update primitive.
    async fn update_many(&self, entities: Vec<Box<dyn Entity>>) -> Result<()>;

    /// Bulk physical-removal primitive. Returns how many rows existed.
    async fn remove_many(&self, keys: &[EntityKey]) -> Result<usize>;

    /// All rows of one entity type, default-filtered like [`fetch`].
    ///
    /// [`fetch`]: EntityStore::fetch
    async fn list(&self, entity_type: &str, with_deleted: bool) -> Result<Vec<Box<dyn Entity>>>;
}
