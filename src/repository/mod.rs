//! Typed repositories.
//!
//! A [`Repository`] is the public write surface over one entity type.
//! It stages work in a [`WorkSession`] and routes soft deletes through
//! the [`CascadeEngine`], so callers never hand-roll the delete walk or
//! the concurrency checks.

use crate::cancel::CancelToken;
use crate::cascade::CascadeEngine;
use crate::core::{AppError, Entity, EntityKey, Result};
use crate::mapping::EntityMap;
use crate::paging::{PageRequest, Paged};
use crate::session::WorkSession;
use crate::storage::EntityStore;
use chrono::Utc;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A concrete entity type a [`Repository`] can be parameterized over.
pub trait DomainEntity: Entity + Clone {
    const ENTITY_TYPE: &'static str;

    type Id: fmt::Display + Clone + Send + Sync;

    fn id(&self) -> Self::Id;

    fn key_for(id: &Self::Id) -> EntityKey {
        EntityKey::new(Self::ENTITY_TYPE, id.to_string())
    }
}

/// Store-backed repository for one entity type.
pub struct Repository<E: DomainEntity> {
    store: Arc<dyn EntityStore>,
    map: Arc<EntityMap>,
    cascade: CascadeEngine,
    _entity: PhantomData<fn() -> E>,
}

impl<E: DomainEntity> Repository<E> {
    pub fn new(store: Arc<dyn EntityStore>, map: Arc<EntityMap>) -> Self {
        Self {
            store,
            cascade: CascadeEngine::new(map.clone()),
            map,
            _entity: PhantomData,
        }
    }

    /// Opens a fresh unit of work over this repository's store.
    pub fn session(&self) -> WorkSession {
        WorkSession::new(self.store.clone(), self.map.clone())
    }

    pub fn add(&self, session: &mut WorkSession, entity: E) -> Result<()> {
        session.track_new(Box::new(entity))
    }

    pub fn add_range(&self, session: &mut WorkSession, entities: Vec<E>) -> Result<()> {
        if entities.is_empty() {
            return Err(AppError::Validation(format!(
                "no {} entities supplied",
                E::ENTITY_TYPE
            )));
        }
        for entity in entities {
            session.track_new(Box::new(entity))?;
        }
        Ok(())
    }

    pub fn update(&self, session: &mut WorkSession, entity: E) {
        session.track_update(Box::new(entity));
    }

    pub fn update_range(&self, session: &mut WorkSession, entities: Vec<E>) -> Result<()> {
        if entities.is_empty() {
            return Err(AppError::Validation(format!(
                "no {} entities supplied",
                E::ENTITY_TYPE
            )));
        }
        for entity in entities {
            session.track_update(Box::new(entity));
        }
        Ok(())
    }

    /// Stages a delete. Soft deletes walk the relation graph and stamp
    /// every reachable deletion-aware dependent with one shared
    /// timestamp; permanent deletes remove only this row.
    pub async fn delete(
        &self,
        session: &mut WorkSession,
        entity: E,
        permanent: bool,
        cancel: &CancelToken,
    ) -> Result<()> {
        if permanent {
            session.track_remove(Box::new(entity));
            return Ok(());
        }
        let key = entity.key();
        session.attach(Box::new(entity));
        self.cascade.soft_delete(session, &key, None, cancel).await
    }

    pub async fn delete_range(
        &self,
        session: &mut WorkSession,
        entities: Vec<E>,
        permanent: bool,
        cancel: &CancelToken,
    ) -> Result<()> {
        if entities.is_empty() {
            return Err(AppError::Validation(format!(
                "no {} entities supplied",
                E::ENTITY_TYPE
            )));
        }
        if permanent {
            for entity in entities {
                session.track_remove(Box::new(entity));
            }
            return Ok(());
        }
        // One timestamp for the whole batch, same as within one cascade.
        let stamp = Utc::now();
        for entity in entities {
            let key = entity.key();
            session.attach(Box::new(entity));
            self.cascade
                .soft_delete(session, &key, Some(stamp), cancel)
                .await?;
        }
        Ok(())
    }

    /// Fetches one entity by id. Soft-deleted rows are invisible unless
    /// `with_deleted` is set.
    pub async fn get(&self, id: &E::Id, with_deleted: bool) -> Result<Option<E>> {
        let key = E::key_for(id);
        let Some(entity) = self.store.fetch(&key, with_deleted).await? else {
            return Ok(None);
        };
        let concrete = entity
            .as_any()
            .downcast_ref::<E>()
            .cloned()
            .ok_or_else(|| {
                AppError::Storage(format!("row '{key}' is not a {}", E::ENTITY_TYPE))
            })?;
        Ok(Some(concrete))
    }

    pub async fn list(&self, with_deleted: bool) -> Result<Vec<E>> {
        let rows = self.store.list(E::ENTITY_TYPE, with_deleted).await?;
        let mut entities = Vec::with_capacity(rows.len());
        for row in rows {
            let key = row.key();
            let concrete = row.as_any().downcast_ref::<E>().cloned().ok_or_else(|| {
                AppError::Storage(format!("row '{key}' is not a {}", E::ENTITY_TYPE))
            })?;
            entities.push(concrete);
        }
        Ok(entities)
    }

    pub async fn list_paged(
        &self,
        page: PageRequest,
        with_deleted: bool,
    ) -> Result<Paged<E>> {
        page.validate()?;
        let all = self.list(with_deleted).await?;
        Ok(Paged::from_items(all, page))
    }
}
