//! One-stop imports for application code.
//!
//! Pulls in the traits an app implements (entities, handlers,
//! behaviors) and the types it constructs (repositories, sessions, the
//! mediator). Internals such as the registry and the store trait's
//! bulk methods stay behind their own modules.

pub use crate::behaviors::{
    AuthorizationBehavior, CacheRemovingBehavior, CachingBehavior, LoggingBehavior,
    PerformanceBehavior,
};
pub use crate::cache::{CacheStore, MemoryCache};
pub use crate::cancel::CancelToken;
pub use crate::cascade::CascadeEngine;
pub use crate::config::MediatorConfig;
pub use crate::core::{AppError, Entity, EntityKey, Result, RowVersion, Timestamps};
pub use crate::identity::{
    Identity, IdentityMode, IdentityProvider, SharedIdentityProvider, StaticIdentityProvider,
};
pub use crate::mapping::{
    CascadePolicy, EntityMap, EntityTypeMap, Ownership, RelationDescriptor, RelationKind,
    RelationValue,
};
pub use crate::mediator::event::{Event, EventHandler};
pub use crate::mediator::request::{PipelineBehavior, Request, RequestHandler};
pub use crate::mediator::stream::{StreamBehavior, StreamHandler, StreamNext, StreamRequest};
pub use crate::mediator::{
    AuthRequirement, CacheInvalidationOptions, CacheOptions, DispatchContext, LogOptions,
    Mediator, MediatorBuilder, Next, PerformanceOptions,
};
pub use crate::paging::{PageRequest, Paged};
pub use crate::repository::{DomainEntity, Repository};
pub use crate::session::{ChangeState, WorkSession};
pub use crate::storage::{EntityStore, MemoryStore, PersistedState};
