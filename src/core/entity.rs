use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Identity of a persisted record, erased for the dynamic graph
/// machinery. Typed entities render their caller-supplied key type
/// (numeric, UUID, ...) into the `id` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub entity_type: &'static str,
    pub id: String,
}

impl EntityKey {
    pub fn new(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self {
            entity_type,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.id)
    }
}

/// Lifecycle timestamps carried by every persisted record.
///
/// `created_at` is set once at creation and never mutated afterwards.
/// `updated_at` is stamped by the session on every successful update.
/// A non-null `deleted_at` marks the record soft-deleted; such rows are
/// excluded from default reads by the storage layer's global filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Timestamps {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Default for Timestamps {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque optimistic-concurrency token.
///
/// The application layer only ever compares tokens for equality; the
/// storage collaborator is the one that mutates the token on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowVersion(u64);

impl RowVersion {
    pub const fn initial() -> Self {
        Self(1)
    }

    /// Storage-side successor token. Application code never calls this.
    pub const fn bumped(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Default for RowVersion {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for RowVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Object-safe base shape of all persisted records.
///
/// Concrete entity types implement this by hand. Relation shape does
/// not live here; it comes entirely from the [`EntityMap`] metadata at
/// the moment of traversal.
///
/// [`EntityMap`]: crate::mapping::EntityMap
pub trait Entity: Any + Send + Sync {
    /// Mapping name of this entity type, matching its `EntityMap`
    /// registration.
    fn entity_type(&self) -> &'static str;

    fn key(&self) -> EntityKey;

    fn timestamps(&self) -> &Timestamps;

    fn timestamps_mut(&mut self) -> &mut Timestamps;

    fn row_version(&self) -> RowVersion;

    /// Called by the storage layer when it assigns a fresh token on
    /// write. Application code never calls this.
    fn set_row_version(&mut self, version: RowVersion);

    fn clone_entity(&self) -> Box<dyn Entity>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Entity {
    pub fn is_deleted(&self) -> bool {
        self.timestamps().is_deleted()
    }

    pub fn downcast_ref<E: Entity>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }

    pub fn downcast_mut<E: Entity>(&mut self) -> Option<&mut E> {
        self.as_any_mut().downcast_mut::<E>()
    }
}
