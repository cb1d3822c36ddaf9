use super::{EntityStore, PersistedState};
use crate::core::{AppError, Entity, EntityKey, Result, RowVersion};
use crate::mapping::{EntityMap, RelationDescriptor};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct StoredRow {
    entity: Box<dyn Entity>,
    version: RowVersion,
}

/// In-memory storage engine.
///
/// Rows are keyed by [`EntityKey`]; every committed write bumps the
/// row's version token. Relation queries are answered by scanning the
/// target type and applying the relation's child-to-parent extractor
/// from the shared [`EntityMap`].
pub struct MemoryStore {
    map: Arc<EntityMap>,
    rows: RwLock<HashMap<EntityKey, StoredRow>>,
}

impl MemoryStore {
    pub fn new(map: Arc<EntityMap>) -> Self {
        Self {
            map,
            rows: RwLock::new(HashMap::new()),
        }
    }

    pub fn entity_map(&self) -> &Arc<EntityMap> {
        &self.map
    }

    /// Number of physically present rows, soft-deleted ones included.
    pub async fn row_count(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn fetch(&self, key: &EntityKey, with_deleted: bool) -> Result<Option<Box<dyn Entity>>> {
        let rows = self.rows.read().await;
        let Some(stored) = rows.get(key) else {
            return Ok(None);
        };
        // Global read filter: soft-deleted rows are invisible by default.
        if !with_deleted && stored.entity.is_deleted() {
            return Ok(None);
        }
        let mut copy = stored.entity.clone_entity();
        copy.set_row_version(stored.version);
        Ok(Some(copy))
    }

    async fn persisted_state(&self, key: &EntityKey) -> Result<Option<PersistedState>> {
        let rows = self.rows.read().await;
        Ok(rows.get(key).map(|stored| PersistedState {
            row_version: stored.version,
            deleted_at: stored.entity.timestamps().deleted_at,
        }))
    }

    async fn load_relation(
        &self,
        parent: &EntityKey,
        relation: &RelationDescriptor,
    ) -> Result<Vec<EntityKey>> {
        if !relation.supports_loading() {
            return Err(AppError::Storage(format!(
                "relation '{}' of '{}' has no loader and was not materialized",
                relation.name(),
                parent.entity_type
            )));
        }
        let rows = self.rows.read().await;
        let mut related = Vec::new();
        for (key, stored) in rows.iter() {
            if key.entity_type != relation.target() {
                continue;
            }
            if relation.parent_of(stored.entity.as_ref()) == Some(parent.clone()) {
                related.push(key.clone());
            }
        }
        // HashMap scan order is not stable; keep traversal deterministic
        // for a fixed graph shape.
        related.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(related)
    }

    async fn insert(&self, entity: Box<dyn Entity>) -> Result<RowVersion> {
        let key = entity.key();
        let mut rows = self.rows.write().await;
        if rows.contains_key(&key) {
            return Err(AppError::Storage(format!("row '{key}' already exists")));
        }
        let version = RowVersion::initial();
        let mut stored = entity;
        stored.set_row_version(version);
        rows.insert(
            key,
            StoredRow {
                entity: stored,
                version,
            },
        );
        Ok(version)
    }

    async fn update(&self, entity: Box<dyn Entity>) -> Result<RowVersion> {
        let key = entity.key();
        let mut rows = self.rows.write().await;
        let Some(stored) = rows.get_mut(&key) else {
            return Err(AppError::RowVanished(key));
        };
        let version = stored.version.bumped();
        let mut replacement = entity;
        replacement.set_row_version(version);
        stored.entity = replacement;
        stored.version = version;
        Ok(version)
    }

    async fn remove(&self, key: &EntityKey) -> Result<bool> {
        let mut rows = self.rows.write().await;
        Ok(rows.remove(key).is_some())
    }

    async fn insert_many(&self, entities: Vec<Box<dyn Entity>>) -> Result<()> {
        for entity in entities {
            self.insert(entity).await?;
        }
        Ok(())
    }

    async fn update_many(&self, entities: Vec<Box<dyn Entity>>) -> Result<()> {
        for entity in entities {
            self.update(entity).await?;
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[EntityKey]) -> Result<usize> {
        let mut removed = 0;
        for key in keys {
            if self.remove(key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn list(&self, entity_type: &str, with_deleted: bool) -> Result<Vec<Box<dyn Entity>>> {
        let rows = self.rows.read().await;
        let mut result = Vec::new();
        for (key, stored) in rows.iter() {
            if key.entity_type != entity_type {
                continue;
            }
            if !with_deleted && stored.entity.is_deleted() {
                continue;
            }
            let mut copy = stored.entity.clone_entity();
            copy.set_row_version(stored.version);
            result.push(copy);
        }
        result.sort_by(|a, b| a.key().id.cmp(&b.key().id));
        Ok(result)
    }
}
