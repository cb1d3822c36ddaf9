//! Unit of work.
//!
//! A [`WorkSession`] tracks the entities touched by one top-level call
//! and commits them in a single `save_changes` pass. Sessions are not
//! shared between in-flight requests; each dispatch or repository call
//! operates on its own session and discards it on failure.

pub mod guard;

use crate::core::{AppError, Entity, EntityKey, Result};
use crate::mapping::{EntityMap, RelationDescriptor};
use crate::storage::EntityStore;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

/// Change-tracking state of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeState {
    Unchanged,
    Added,
    Modified,
    Deleted { permanent: bool },
}

struct TrackedEntry {
    entity: Box<dyn Entity>,
    state: ChangeState,
}

/// Per-call unit of work over an [`EntityStore`].
pub struct WorkSession {
    store: Arc<dyn EntityStore>,
    map: Arc<EntityMap>,
    entries: HashMap<EntityKey, TrackedEntry>,
    // Commit order is tracking order; HashMap iteration would make
    // partial batch application nondeterministic.
    order: Vec<EntityKey>,
}

impl WorkSession {
    pub fn new(store: Arc<dyn EntityStore>, map: Arc<EntityMap>) -> Self {
        Self {
            store,
            map,
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn entity_map(&self) -> &Arc<EntityMap> {
        &self.map
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    fn insert_entry(&mut self, key: EntityKey, entry: TrackedEntry) {
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.entries.insert(key, entry);
    }

    /// Begins tracking a new entity for insertion on commit.
    pub fn track_new(&mut self, entity: Box<dyn Entity>) -> Result<()> {
        let key = entity.key();
        if self.entries.contains_key(&key) {
            return Err(AppError::Validation(format!(
                "entity '{key}' is already tracked by this session"
            )));
        }
        self.insert_entry(
            key,
            TrackedEntry {
                entity,
                state: ChangeState::Added,
            },
        );
        Ok(())
    }

    /// Begins tracking an entity loaded elsewhere for update on commit.
    /// The entity's own row version is the captured concurrency token.
    pub fn track_update(&mut self, entity: Box<dyn Entity>) {
        let key = entity.key();
        self.insert_entry(
            key,
            TrackedEntry {
                entity,
                state: ChangeState::Modified,
            },
        );
    }

    /// Begins tracking an entity for physical removal on commit.
    pub fn track_remove(&mut self, entity: Box<dyn Entity>) {
        let key = entity.key();
        self.insert_entry(
            key,
            TrackedEntry {
                entity,
                state: ChangeState::Deleted { permanent: true },
            },
        );
    }

    /// Tracks a caller-held instance as unchanged, so later loads reuse
    /// it (and its loaded relations) instead of refetching. Entities
    /// already tracked keep their current state.
    pub fn attach(&mut self, entity: Box<dyn Entity>) {
        let key = entity.key();
        if self.entries.contains_key(&key) {
            return;
        }
        self.insert_entry(
            key,
            TrackedEntry {
                entity,
                state: ChangeState::Unchanged,
            },
        );
    }

    /// Loads the entity behind `key` into the session if it is not
    /// already tracked. Returns whether the entity exists at all.
    /// Soft-deleted rows are materialized too; the cascade relies on
    /// seeing them.
    pub async fn materialize(&mut self, key: &EntityKey) -> Result<bool> {
        if self.entries.contains_key(key) {
            return Ok(true);
        }
        let Some(entity) = self.store.fetch(key, true).await? else {
            return Ok(false);
        };
        self.insert_entry(
            key.clone(),
            TrackedEntry {
                entity,
                state: ChangeState::Unchanged,
            },
        );
        Ok(true)
    }

    pub fn entity(&self, key: &EntityKey) -> Option<&dyn Entity> {
        self.entries.get(key).map(|entry| entry.entity.as_ref())
    }

    pub fn entity_mut(&mut self, key: &EntityKey) -> Option<&mut dyn Entity> {
        self.entries.get_mut(key).map(|entry| entry.entity.as_mut())
    }

    pub(crate) fn require(&self, key: &EntityKey) -> Result<&dyn Entity> {
        self.entity(key)
            .ok_or_else(|| AppError::Storage(format!("entity '{key}' is not tracked")))
    }

    pub(crate) fn require_mut(&mut self, key: &EntityKey) -> Result<&mut dyn Entity> {
        self.entries
            .get_mut(key)
            .map(|entry| entry.entity.as_mut() as &mut dyn Entity)
            .ok_or_else(|| AppError::Storage(format!("entity '{key}' is not tracked")))
    }

    pub fn state(&self, key: &EntityKey) -> Option<ChangeState> {
        self.entries.get(key).map(|entry| entry.state)
    }

    /// Promotes an unchanged entry to modified. Added and deleted
    /// entries keep their stronger state.
    pub fn mark_modified(&mut self, key: &EntityKey) -> Result<()> {
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| AppError::Storage(format!("entity '{key}' is not tracked")))?;
        if entry.state == ChangeState::Unchanged {
            entry.state = ChangeState::Modified;
        }
        Ok(())
    }

    /// Marks an entry for deletion on commit. A soft delete on an entry
    /// added in this same session stays an insert (the row is born
    /// already stamped).
    pub fn mark_deleted(&mut self, key: &EntityKey, permanent: bool) -> Result<()> {
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| AppError::Storage(format!("entity '{key}' is not tracked")))?;
        match entry.state {
            ChangeState::Added if !permanent => {}
            ChangeState::Deleted { permanent: true } => {}
            _ => entry.state = ChangeState::Deleted { permanent },
        }
        Ok(())
    }

    /// On-demand relation load for the cascade walk.
    pub async fn load_relation(
        &self,
        parent: &EntityKey,
        relation: &RelationDescriptor,
    ) -> Result<Vec<EntityKey>> {
        self.store.load_relation(parent, relation).await
    }

    /// Number of entries that would be written by `save_changes`.
    pub fn pending_changes(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.state != ChangeState::Unchanged)
            .count()
    }

    /// Commits tracked changes in tracking order.
    ///
    /// Updates and soft deletes are re-validated by the concurrency
    /// guard per entity; the first conflict aborts the remaining batch.
    /// Entries committed before the conflict stay committed; the
    /// surrounding transaction, if any, is supplied externally.
    pub async fn save_changes(&mut self) -> Result<()> {
        let order = self.order.clone();
        for key in order {
            let Some(entry) = self.entries.get(&key) else {
                continue;
            };
            match entry.state {
                ChangeState::Unchanged => {}
                ChangeState::Added => {
                    let version = self.store.insert(entry.entity.clone_entity()).await?;
                    if let Some(entry) = self.entries.get_mut(&key) {
                        entry.entity.set_row_version(version);
                        entry.state = ChangeState::Unchanged;
                    }
                }
                ChangeState::Modified => {
                    guard::check_write(self.store.as_ref(), entry.entity.as_ref(), false).await?;
                    let version = if let Some(entry) = self.entries.get_mut(&key) {
                        entry.entity.timestamps_mut().updated_at = Some(Utc::now());
                        self.store.update(entry.entity.clone_entity()).await?
                    } else {
                        continue;
                    };
                    if let Some(entry) = self.entries.get_mut(&key) {
                        entry.entity.set_row_version(version);
                        entry.state = ChangeState::Unchanged;
                    }
                }
                ChangeState::Deleted { permanent: false } => {
                    guard::check_write(self.store.as_ref(), entry.entity.as_ref(), false).await?;
                    let version = self.store.update(entry.entity.clone_entity()).await?;
                    if let Some(entry) = self.entries.get_mut(&key) {
                        entry.entity.set_row_version(version);
                        entry.state = ChangeState::Unchanged;
                    }
                }
                ChangeState::Deleted { permanent: true } => {
                    self.store.remove(&key).await?;
                    self.entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}
