//! Handler/behavior registry.
//!
//! Built once at startup by explicit registration calls, read-only
//! afterwards and safe for unrestricted concurrent reads. Entries are
//! keyed by the request's `TypeId` and hold type-erased `Arc` bundles;
//! resolution is a map lookup plus a downcast, no per-call scanning.

use super::event::{Event, EventHandler};
use super::request::{PipelineBehavior, Request, RequestHandler};
use super::stream::{StreamBehavior, StreamHandler, StreamRequest};
use super::Mediator;
use crate::config::MediatorConfig;
use crate::identity::{SharedIdentityProvider, StaticIdentityProvider};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

type Erased = Box<dyn Any + Send + Sync>;

#[derive(Default)]
pub(super) struct Registry {
    pub(super) handlers: HashMap<TypeId, Erased>,
    pub(super) behaviors: HashMap<TypeId, Erased>,
    pub(super) event_handlers: HashMap<TypeId, Erased>,
    pub(super) stream_handlers: HashMap<TypeId, Erased>,
    pub(super) stream_behaviors: HashMap<TypeId, Erased>,
}

impl Registry {
    pub(super) fn handler_for<R: Request>(&self) -> Option<&Arc<dyn RequestHandler<R>>> {
        self.handlers
            .get(&TypeId::of::<R>())
            .and_then(|erased| erased.downcast_ref::<Arc<dyn RequestHandler<R>>>())
    }

    /// Behaviors for `R` in registration order (first registered runs
    /// outermost).
    pub(super) fn behaviors_for<R: Request>(&self) -> &[Arc<dyn PipelineBehavior<R>>] {
        self.behaviors
            .get(&TypeId::of::<R>())
            .and_then(|erased| erased.downcast_ref::<Vec<Arc<dyn PipelineBehavior<R>>>>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(super) fn event_handlers_for<E: Event>(&self) -> &[Arc<dyn EventHandler<E>>] {
        self.event_handlers
            .get(&TypeId::of::<E>())
            .and_then(|erased| erased.downcast_ref::<Vec<Arc<dyn EventHandler<E>>>>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(super) fn stream_handler_for<R: StreamRequest>(&self) -> Option<&Arc<dyn StreamHandler<R>>> {
        self.stream_handlers
            .get(&TypeId::of::<R>())
            .and_then(|erased| erased.downcast_ref::<Arc<dyn StreamHandler<R>>>())
    }

    pub(super) fn stream_behaviors_for<R: StreamRequest>(&self) -> &[Arc<dyn StreamBehavior<R>>] {
        self.stream_behaviors
            .get(&TypeId::of::<R>())
            .and_then(|erased| erased.downcast_ref::<Vec<Arc<dyn StreamBehavior<R>>>>())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Startup-time registration surface for the [`Mediator`].
pub struct MediatorBuilder {
    config: MediatorConfig,
    identity: SharedIdentityProvider,
    registry: Registry,
}

impl MediatorBuilder {
    pub fn new() -> Self {
        Self {
            config: MediatorConfig::new(),
            identity: Arc::new(StaticIdentityProvider::empty()),
            registry: Registry::default(),
        }
    }

    pub fn config(mut self, config: MediatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn identity_provider(mut self, provider: SharedIdentityProvider) -> Self {
        self.identity = provider;
        self
    }

    /// Registers the handler for `R`. Exactly one handler exists per
    /// request type; a later registration replaces an earlier one.
    pub fn handler<R, H>(mut self, handler: H) -> Self
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        let erased: Arc<dyn RequestHandler<R>> = Arc::new(handler);
        self.registry
            .handlers
            .insert(TypeId::of::<R>(), Box::new(erased));
        self
    }

    /// Appends a behavior for `R`. Registration order is execution
    /// order for the "before" sections; "after" sections run in exact
    /// reverse.
    pub fn behavior<R, B>(mut self, behavior: B) -> Self
    where
        R: Request,
        B: PipelineBehavior<R> + 'static,
    {
        let entry = self
            .registry
            .behaviors
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Box::new(Vec::<Arc<dyn PipelineBehavior<R>>>::new()));
        if let Some(list) = entry.downcast_mut::<Vec<Arc<dyn PipelineBehavior<R>>>>() {
            list.push(Arc::new(behavior));
        }
        self
    }

    /// Appends an event handler for `E`. Any number may be registered.
    pub fn event_handler<E, H>(mut self, handler: H) -> Self
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        let entry = self
            .registry
            .event_handlers
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<Arc<dyn EventHandler<E>>>::new()));
        if let Some(list) = entry.downcast_mut::<Vec<Arc<dyn EventHandler<E>>>>() {
            list.push(Arc::new(handler));
        }
        self
    }

    /// Registers the streaming handler for `R`.
    pub fn stream_handler<R, H>(mut self, handler: H) -> Self
    where
        R: StreamRequest,
        H: StreamHandler<R> + 'static,
    {
        let erased: Arc<dyn StreamHandler<R>> = Arc::new(handler);
        self.registry
            .stream_handlers
            .insert(TypeId::of::<R>(), Box::new(erased));
        self
    }

    /// Appends a streaming behavior for `R`, in registration order.
    pub fn stream_behavior<R, B>(mut self, behavior: B) -> Self
    where
        R: StreamRequest,
        B: StreamBehavior<R> + 'static,
    {
        let entry = self
            .registry
            .stream_behaviors
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Box::new(Vec::<Arc<dyn StreamBehavior<R>>>::new()));
        if let Some(list) = entry.downcast_mut::<Vec<Arc<dyn StreamBehavior<R>>>>() {
            list.push(Arc::new(behavior));
        }
        self
    }

    pub fn build(self) -> Mediator {
        Mediator::from_parts(self.config, self.identity, self.registry)
    }
}

impl Default for MediatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
