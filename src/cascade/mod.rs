//! Soft-delete cascade engine.
//!
//! Walks the relation metadata of an entity transitively, stamping one
//! deletion instant across the whole reachable subgraph inside an
//! in-progress [`WorkSession`]; the caller commits afterwards. The
//! entity's own `deleted_at` field doubles as the visited marker: a
//! node is stamped before its relations are explored, so revisiting it
//! via a back-edge in a cyclic graph stops immediately, and re-deleting
//! an already-deleted entity is a no-op.

use crate::cancel::CancelToken;
use crate::core::{EntityKey, Result};
use crate::mapping::{CascadePolicy, EntityMap, Ownership, RelationKind, RelationValue};
use crate::session::WorkSession;
use async_recursion::async_recursion;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct CascadeEngine {
    map: Arc<EntityMap>,
}

impl CascadeEngine {
    pub fn new(map: Arc<EntityMap>) -> Self {
        Self { map }
    }

    /// Recursively soft-deletes the entity behind `key` and every
    /// cascaded relation, sharing a single deletion instant.
    ///
    /// `stamp` defaults to the current UTC time, resolved once at the
    /// root call and threaded through the entire traversal. The walk
    /// never validates foreign-key shape up front and never raises
    /// "entity has relations"; only commit-time storage constraints can
    /// fail later.
    pub async fn soft_delete(
        &self,
        session: &mut WorkSession,
        key: &EntityKey,
        stamp: Option<DateTime<Utc>>,
        cancel: &CancelToken,
    ) -> Result<()> {
        let stamp = stamp.unwrap_or_else(Utc::now);
        self.walk(session, key, stamp, cancel).await
    }

    #[async_recursion]
    async fn walk(
        &self,
        session: &mut WorkSession,
        key: &EntityKey,
        stamp: DateTime<Utc>,
        cancel: &CancelToken,
    ) -> Result<()> {
        cancel.check()?;

        // Lazy-load the node if this traversal has not touched it yet.
        // A key with no row behind it means there is no related data to
        // cascade into, not an error.
        if !session.materialize(key).await? {
            return Ok(());
        }
        if session.require(key)?.timestamps().deleted_at.is_some() {
            // Idempotent re-entrancy guard; also the cycle breaker.
            return Ok(());
        }

        // Stamp before exploring relations so back-edges terminate.
        session.require_mut(key)?.timestamps_mut().deleted_at = Some(stamp);
        session.mark_deleted(key, false)?;
        tracing::debug!(entity = %key, "soft-delete stamped");

        for relation in self.map.relations(key.entity_type) {
            // Owned components are not independently addressable; the
            // storage engine's own cascade covers them.
            if relation.ownership() == Ownership::Owned {
                continue;
            }
            // Only follow nodes that can themselves be soft-deleted.
            if !self.map.is_deletion_aware(relation.target()) {
                continue;
            }
            // A one-to-one dependent shares the lifecycle of its
            // principal and is cascaded unconditionally once reached.
            let follow = relation.cascade_policy() == CascadePolicy::Cascade
                || (relation.kind() == RelationKind::Single && relation.is_dependent());
            if !follow {
                continue;
            }

            let value = relation.resolve(session.require(key)?);
            let related: Vec<EntityKey> = match value {
                RelationValue::None => Vec::new(),
                RelationValue::Single(related) => vec![related],
                RelationValue::Collection(related) => related,
                RelationValue::NotLoaded => {
                    // An unloaded relation must not be silently skipped.
                    session.load_relation(key, relation).await?
                }
            };

            for child in related {
                self.walk(session, &child, stamp, cancel).await?;
            }
        }

        Ok(())
    }
}
