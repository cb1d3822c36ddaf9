#![allow(dead_code)]

//! Shared fixture: a small commerce graph exercising every relation
//! shape the cascade distinguishes.
//!
//! category --children--> category          (cascade, lazy-loaded)
//! category --products--> product           (cascade, lazy-loaded)
//! product  --detail----> product_detail    (one-to-one dependent)
//! product  --tags------> tag               (target not deletion-aware)
//! product  --audit-----> audit_log         (restrict: never followed)
//! product  --box_spec--> spec              (owned: never followed)
//! profile  --buddy-----> profile           (cascade, cyclic pairs)

use layerkit::prelude::*;
use std::any::Any;
use std::sync::Arc;

macro_rules! test_entity {
    ($ty:ident, $name:literal) => {
        impl Entity for $ty {
            fn entity_type(&self) -> &'static str {
                $name
            }

            fn key(&self) -> EntityKey {
                EntityKey::new($name, self.id.clone())
            }

            fn timestamps(&self) -> &Timestamps {
                &self.timestamps
            }

            fn timestamps_mut(&mut self) -> &mut Timestamps {
                &mut self.timestamps
            }

            fn row_version(&self) -> RowVersion {
                self.version
            }

            fn set_row_version(&mut self, version: RowVersion) {
                self.version = version;
            }

            fn clone_entity(&self) -> Box<dyn Entity> {
                Box::new(self.clone())
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
    };
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub timestamps: Timestamps,
    pub version: RowVersion,
}

impl Category {
    pub fn new(id: &str, name: &str, parent_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
            timestamps: Timestamps::new(),
            version: RowVersion::initial(),
        }
    }
}

test_entity!(Category, "category");

impl DomainEntity for Category {
    const ENTITY_TYPE: &'static str = "category";

    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
    pub detail_id: Option<String>,
    pub audit_id: Option<String>,
    pub timestamps: Timestamps,
    pub version: RowVersion,
}

impl Product {
    pub fn new(id: &str, name: &str, category_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category_id: category_id.map(str::to_string),
            detail_id: None,
            audit_id: None,
            timestamps: Timestamps::new(),
            version: RowVersion::initial(),
        }
    }

    pub fn with_detail(mut self, detail_id: &str) -> Self {
        self.detail_id = Some(detail_id.to_string());
        self
    }

    pub fn with_audit(mut self, audit_id: &str) -> Self {
        self.audit_id = Some(audit_id.to_string());
        self
    }
}

test_entity!(Product, "product");

impl DomainEntity for Product {
    const ENTITY_TYPE: &'static str = "product";

    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub id: String,
    pub description: String,
    pub timestamps: Timestamps,
    pub version: RowVersion,
}

impl ProductDetail {
    pub fn new(id: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            timestamps: Timestamps::new(),
            version: RowVersion::initial(),
        }
    }
}

test_entity!(ProductDetail, "product_detail");

#[derive(Debug, Clone)]
pub struct Tag {
    pub id: String,
    pub label: String,
    pub timestamps: Timestamps,
    pub version: RowVersion,
}

impl Tag {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            timestamps: Timestamps::new(),
            version: RowVersion::initial(),
        }
    }
}

test_entity!(Tag, "tag");

#[derive(Debug, Clone)]
pub struct AuditLog {
    pub id: String,
    pub timestamps: Timestamps,
    pub version: RowVersion,
}

impl AuditLog {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            timestamps: Timestamps::new(),
            version: RowVersion::initial(),
        }
    }
}

test_entity!(AuditLog, "audit_log");

#[derive(Debug, Clone)]
pub struct Profile {
    pub id: String,
    pub buddy_id: Option<String>,
    pub timestamps: Timestamps,
    pub version: RowVersion,
}

impl Profile {
    pub fn new(id: &str, buddy_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            buddy_id: buddy_id.map(str::to_string),
            timestamps: Timestamps::new(),
            version: RowVersion::initial(),
        }
    }
}

test_entity!(Profile, "profile");

/// The fixture metadata. Category relations are intentionally left
/// unmaterialized so the cascade must load them on demand.
pub fn entity_map() -> Arc<EntityMap> {
    let map = EntityMap::new()
        .register(
            EntityTypeMap::new("category")
                .relation(
                    RelationDescriptor::collection("children", "category", |_| {
                        RelationValue::NotLoaded
                    })
                    .loaded_by(|child| {
                        child.downcast_ref::<Category>().and_then(|c| {
                            c.parent_id
                                .as_ref()
                                .map(|parent| EntityKey::new("category", parent.clone()))
                        })
                    }),
                )
                .relation(
                    RelationDescriptor::collection("products", "product", |_| {
                        RelationValue::NotLoaded
                    })
                    .loaded_by(|child| {
                        child.downcast_ref::<Product>().and_then(|p| {
                            p.category_id
                                .as_ref()
                                .map(|cat| EntityKey::new("category", cat.clone()))
                        })
                    }),
                ),
        )
        .register(
            EntityTypeMap::new("product")
                .relation(
                    RelationDescriptor::single("detail", "product_detail", |e| {
                        match e.downcast_ref::<Product>().and_then(|p| p.detail_id.clone()) {
                            Some(id) => RelationValue::Single(EntityKey::new("product_detail", id)),
                            None => RelationValue::None,
                        }
                    })
                    .dependent()
                    .policy(CascadePolicy::NoAction),
                )
                .relation(RelationDescriptor::collection("tags", "tag", |_| {
                    RelationValue::NotLoaded
                }))
                .relation(
                    RelationDescriptor::single("audit", "audit_log", |e| {
                        match e.downcast_ref::<Product>().and_then(|p| p.audit_id.clone()) {
                            Some(id) => RelationValue::Single(EntityKey::new("audit_log", id)),
                            None => RelationValue::None,
                        }
                    })
                    .policy(CascadePolicy::Restrict),
                )
                .relation(
                    RelationDescriptor::collection("box_spec", "spec", |_| {
                        RelationValue::NotLoaded
                    })
                    .owned(),
                ),
        )
        .register(EntityTypeMap::new("product_detail"))
        .register(EntityTypeMap::new("tag").not_deletion_aware())
        .register(EntityTypeMap::new("audit_log"))
        .register(EntityTypeMap::new("profile").relation(RelationDescriptor::single(
            "buddy",
            "profile",
            |e| match e.downcast_ref::<Profile>().and_then(|p| p.buddy_id.clone()) {
                Some(id) => RelationValue::Single(EntityKey::new("profile", id)),
                None => RelationValue::None,
            },
        )));
    Arc::new(map)
}

pub fn store() -> (Arc<MemoryStore>, Arc<EntityMap>) {
    let map = entity_map();
    (Arc::new(MemoryStore::new(map.clone())), map)
}

/// Seeds the canonical graph:
///
/// electronics
/// ├── phones
/// │   ├── p1 (detail d1, audit a1, tag t1)
/// │   └── p2
/// └── laptops
pub async fn seed_catalog(store: &MemoryStore) {
    let rows: Vec<Box<dyn Entity>> = vec![
        Box::new(Category::new("electronics", "Electronics", None)),
        Box::new(Category::new("phones", "Phones", Some("electronics"))),
        Box::new(Category::new("laptops", "Laptops", Some("electronics"))),
        Box::new(
            Product::new("p1", "Handset", Some("phones"))
                .with_detail("d1")
                .with_audit("a1"),
        ),
        Box::new(Product::new("p2", "Spare", Some("phones"))),
        Box::new(ProductDetail::new("d1", "A fine handset")),
        Box::new(Tag::new("t1", "sale")),
        Box::new(AuditLog::new("a1")),
    ];
    store.insert_many(rows).await.unwrap();
}

pub async fn deleted_at_of(store: &MemoryStore, key: &EntityKey) -> Option<chrono::DateTime<chrono::Utc>> {
    store
        .fetch(key, true)
        .await
        .unwrap()
        .map(|e| e.timestamps().deleted_at)
        .unwrap_or(None)
}
