//! Request-dispatch pipeline (mediator).
//!
//! A caller constructs a request value; the dispatcher resolves its one
//! handler and its ordered behaviors from the type-indexed registry and
//! composes them into a single nested invocation chain. The chain is
//! built by wrapping the terminal handler continuation from the last
//! registered behavior to the first, so the first registration runs
//! outermost: its pre-`next` code executes first and its post-`next`
//! code executes last. Any behavior may decline to call onward
//! (short-circuit) or observe an error surfacing out of its `next`
//! call; errors otherwise propagate unchanged.

pub mod event;
pub mod registry;
pub mod request;
pub mod stream;

use crate::cancel::CancelToken;
use crate::config::MediatorConfig;
use crate::core::{AppError, Result};
use crate::identity::{Identity, IdentityMode, SharedIdentityProvider};
use event::Event;
use futures::future;
use futures::stream::{self as fstream, BoxStream, StreamExt};
use registry::Registry;
use request::{PipelineBehavior, Request, RequestHandler};
use std::any::type_name;
use std::sync::Arc;
use stream::{StreamNext, StreamRequest};

pub use registry::MediatorBuilder;
pub use request::{
    AuthRequirement, CacheInvalidationOptions, CacheOptions, LogOptions, PerformanceOptions,
};

/// Per-call scope handed to every stage of one dispatch.
///
/// A fresh context is created at the start of each top-level call and
/// torn down at the end; no ambient or thread-local state is involved.
#[derive(Clone)]
pub struct DispatchContext {
    identity: Option<Identity>,
    cancel: CancelToken,
    config: Arc<MediatorConfig>,
}

impl DispatchContext {
    fn new(identity: Option<Identity>, cancel: CancelToken, config: Arc<MediatorConfig>) -> Self {
        Self {
            identity,
            cancel,
            config,
        }
    }

    /// Snapshot of the current actor. `None` only in strict identity
    /// mode with no context available.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn cancel(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }
}

/// Continuation handed to a [`PipelineBehavior`]: the remaining
/// behaviors plus the terminal handler invocation.
pub struct Next<'a, R: Request> {
    behaviors: &'a [Arc<dyn PipelineBehavior<R>>],
    handler: &'a dyn RequestHandler<R>,
    ctx: &'a DispatchContext,
}

impl<'a, R: Request> Next<'a, R> {
    /// Runs the rest of the chain. Not calling this is a legal,
    /// intentional short-circuit.
    pub async fn run(self, request: R) -> Result<R::Response> {
        self.ctx.cancel.check()?;
        match self.behaviors.split_first() {
            Some((head, rest)) => {
                let next = Next {
                    behaviors: rest,
                    handler: self.handler,
                    ctx: self.ctx,
                };
                head.handle(request, next, self.ctx).await
            }
            None => self.handler.handle(request, self.ctx).await,
        }
    }
}

/// The pipeline composer. Built once via [`MediatorBuilder`]; cheap to
/// share behind an `Arc` and safe for unrestricted concurrent use.
pub struct Mediator {
    config: Arc<MediatorConfig>,
    identity: SharedIdentityProvider,
    registry: Registry,
}

impl Mediator {
    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::new()
    }

    pub(super) fn from_parts(
        config: MediatorConfig,
        identity: SharedIdentityProvider,
        registry: Registry,
    ) -> Self {
        Self {
            config: Arc::new(config),
            identity,
            registry,
        }
    }

    fn scope(&self, cancel: CancelToken) -> DispatchContext {
        let identity = match self.identity.current() {
            Some(identity) => Some(identity),
            None => match self.config.get_identity_mode() {
                IdentityMode::Permissive => Some(Identity::anonymous()),
                IdentityMode::Strict => None,
            },
        };
        DispatchContext::new(identity, cancel, Arc::clone(&self.config))
    }

    /// Dispatches `request` through its behavior chain to its handler.
    ///
    /// No handler registered for the request type is a fatal
    /// configuration error, never retried.
    pub async fn send<R: Request>(&self, request: R) -> Result<R::Response> {
        self.send_with(request, CancelToken::new()).await
    }

    pub async fn send_with<R: Request>(
        &self,
        request: R,
        cancel: CancelToken,
    ) -> Result<R::Response> {
        let handler = self.registry.handler_for::<R>().ok_or_else(|| {
            AppError::Configuration(format!(
                "no handler registered for request '{}'",
                type_name::<R>()
            ))
        })?;
        let behaviors = self.registry.behaviors_for::<R>();
        let ctx = self.scope(cancel);
        let next = Next {
            behaviors,
            handler: handler.as_ref(),
            ctx: &ctx,
        };
        next.run(request).await
    }

    /// Publishes `event` to every registered handler concurrently.
    ///
    /// Publication does not short-circuit: all handlers run to
    /// completion and the caller receives an aggregate of every
    /// failure, not just the first.
    pub async fn publish<E: Event>(&self, event: E) -> Result<()> {
        self.publish_with(event, CancelToken::new()).await
    }

    pub async fn publish_with<E: Event>(&self, event: E, cancel: CancelToken) -> Result<()> {
        let handlers = self.registry.event_handlers_for::<E>();
        if handlers.is_empty() {
            return Ok(());
        }
        let ctx = self.scope(cancel);
        ctx.cancel.check()?;
        let results =
            future::join_all(handlers.iter().map(|handler| handler.handle(&event, &ctx))).await;
        let failures: Vec<AppError> = results.into_iter().filter_map(Result::err).collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(AppError::Aggregate(failures))
        }
    }

    /// Dispatches a streaming request, returning the composed lazy
    /// sequence. The caller's cancellation signal is forwarded into the
    /// inner stream; on cancellation the sequence yields one
    /// [`AppError::Cancelled`] element and ends.
    pub fn send_stream<R: StreamRequest>(
        &self,
        request: R,
    ) -> Result<BoxStream<'static, Result<R::Item>>> {
        self.send_stream_with(request, CancelToken::new())
    }

    pub fn send_stream_with<R: StreamRequest>(
        &self,
        request: R,
        cancel: CancelToken,
    ) -> Result<BoxStream<'static, Result<R::Item>>> {
        let handler = self
            .registry
            .stream_handler_for::<R>()
            .cloned()
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "no stream handler registered for request '{}'",
                    type_name::<R>()
                ))
            })?;
        let behaviors = self.registry.stream_behaviors_for::<R>().to_vec();
        let ctx = self.scope(cancel.clone());
        let next = StreamNext::new(behaviors, handler, ctx);

        let inner = next.run(request);
        let tail_cancel = cancel.clone();
        let guarded = inner
            .take_until(cancel.cancelled())
            .chain(
                fstream::once(async move { tail_cancel.is_cancelled() }).filter_map(|cancelled| {
                    future::ready(cancelled.then(|| Err(AppError::Cancelled)))
                }),
            )
            .boxed();
        Ok(guarded)
    }
}
