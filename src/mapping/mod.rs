//! Relation metadata accessor.
//!
//! The cascade engine never inspects concrete entity types; everything
//! it knows about the graph shape comes from the [`EntityMap`] built at
//! startup. Descriptors carry the cardinality, ownership and cascade
//! policy of each navigable relation plus two closures: one that reads
//! the relation's current in-memory value off an entity instance, and
//! one that lets the storage layer answer on-demand loads by mapping a
//! candidate child back to its parent key.

use crate::core::{Entity, EntityKey};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// One related instance at most (one-to-one, many-to-one).
    Single,
    /// Any number of related instances (one-to-many, many-to-many).
    Collection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Owned value component; not independently addressable. The
    /// storage engine's own cascade handles these, the soft-delete
    /// walk never does.
    Owned,
    /// Independent entity with its own identity and lifecycle.
    Independent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadePolicy {
    Cascade,
    Restrict,
    NoAction,
}

/// Current in-memory value of a relation as read off an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationValue {
    /// The relation has never been materialized on this instance. The
    /// traversal must load it on demand, not silently skip it.
    NotLoaded,
    /// Loaded, and there is no related data to cascade into.
    None,
    Single(EntityKey),
    Collection(Vec<EntityKey>),
}

type ResolveFn = Box<dyn Fn(&dyn Entity) -> RelationValue + Send + Sync>;
type ParentKeyFn = Box<dyn Fn(&dyn Entity) -> Option<EntityKey> + Send + Sync>;

/// One navigable relation of an entity type.
pub struct RelationDescriptor {
    name: &'static str,
    target: &'static str,
    kind: RelationKind,
    ownership: Ownership,
    policy: CascadePolicy,
    dependent: bool,
    resolve: ResolveFn,
    parent_key: Option<ParentKeyFn>,
}

impl RelationDescriptor {
    pub fn single(
        name: &'static str,
        target: &'static str,
        resolve: impl Fn(&dyn Entity) -> RelationValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            target,
            kind: RelationKind::Single,
            ownership: Ownership::Independent,
            policy: CascadePolicy::Cascade,
            dependent: false,
            resolve: Box::new(resolve),
            parent_key: None,
        }
    }

    pub fn collection(
        name: &'static str,
        target: &'static str,
        resolve: impl Fn(&dyn Entity) -> RelationValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            target,
            kind: RelationKind::Collection,
            ownership: Ownership::Independent,
            policy: CascadePolicy::Cascade,
            dependent: false,
            resolve: Box::new(resolve),
            parent_key: None,
        }
    }

    pub fn policy(mut self, policy: CascadePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn owned(mut self) -> Self {
        self.ownership = Ownership::Owned;
        self
    }

    /// Marks a single-valued relation as the dependent side of a
    /// one-to-one. A dependent shares the lifecycle of its principal
    /// and is cascaded unconditionally once reached.
    pub fn dependent(mut self) -> Self {
        self.dependent = true;
        self
    }

    /// Installs the child-to-parent key extractor the storage layer
    /// uses to answer on-demand loads of this relation.
    pub fn loaded_by(
        mut self,
        parent_key: impl Fn(&dyn Entity) -> Option<EntityKey> + Send + Sync + 'static,
    ) -> Self {
        self.parent_key = Some(Box::new(parent_key));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn kind(&self) -> RelationKind {
        self.kind
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    pub fn cascade_policy(&self) -> CascadePolicy {
        self.policy
    }

    pub fn is_dependent(&self) -> bool {
        self.dependent
    }

    /// Reads the relation's current in-memory value off `entity`.
    pub fn resolve(&self, entity: &dyn Entity) -> RelationValue {
        (self.resolve)(entity)
    }

    /// Maps a candidate child instance back to the parent key it points
    /// at, if this relation supports on-demand loading.
    pub fn parent_of(&self, candidate: &dyn Entity) -> Option<EntityKey> {
        self.parent_key.as_ref().and_then(|f| f(candidate))
    }

    pub fn supports_loading(&self) -> bool {
        self.parent_key.is_some()
    }
}

impl fmt::Debug for RelationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationDescriptor")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("kind", &self.kind)
            .field("ownership", &self.ownership)
            .field("policy", &self.policy)
            .field("dependent", &self.dependent)
            .finish_non_exhaustive()
    }
}

struct EntityTypeMeta {
    deletion_aware: bool,
    relations: Vec<RelationDescriptor>,
}

/// Per-type registration handed to [`EntityMap::register`].
pub struct EntityTypeMap {
    name: &'static str,
    meta: EntityTypeMeta,
}

impl EntityTypeMap {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            meta: EntityTypeMeta {
                deletion_aware: true,
                relations: Vec::new(),
            },
        }
    }

    /// Marks the type as having no deletion-timestamp semantics. The
    /// cascade walk never recurses into such targets.
    pub fn not_deletion_aware(mut self) -> Self {
        self.meta.deletion_aware = false;
        self
    }

    pub fn relation(mut self, descriptor: RelationDescriptor) -> Self {
        self.meta.relations.push(descriptor);
        self
    }
}

/// The live mapping metadata: every navigable relation of every
/// registered entity type. Built once at startup, read-only afterwards,
/// safe for unrestricted concurrent reads.
#[derive(Default)]
pub struct EntityMap {
    types: HashMap<&'static str, EntityTypeMeta>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, entity_type: EntityTypeMap) -> Self {
        self.types.insert(entity_type.name, entity_type.meta);
        self
    }

    /// Navigable relations of a type, in metadata-enumeration order.
    /// Unknown types have no relations.
    pub fn relations(&self, entity_type: &str) -> &[RelationDescriptor] {
        self.types
            .get(entity_type)
            .map(|meta| meta.relations.as_slice())
            .unwrap_or(&[])
    }

    pub fn relation(&self, entity_type: &str, name: &str) -> Option<&RelationDescriptor> {
        self.relations(entity_type)
            .iter()
            .find(|rel| rel.name == name)
    }

    /// Whether instances of the type can themselves be soft-deleted.
    pub fn is_deletion_aware(&self, entity_type: &str) -> bool {
        self.types
            .get(entity_type)
            .map(|meta| meta.deletion_aware)
            .unwrap_or(false)
    }

    pub fn is_registered(&self, entity_type: &str) -> bool {
        self.types.contains_key(entity_type)
    }
}
