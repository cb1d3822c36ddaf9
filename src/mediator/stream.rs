//! Streaming requests.
//!
//! The behavior-wrapping algorithm is identical to the unary pipeline,
//! but the continuation produces a lazy, cancelable sequence instead of
//! a single value. Wrapping behaviors may inspect, transform or pass
//! through the sequence element by element; the dispatcher forwards the
//! caller's cancellation signal into the composed stream.

use super::DispatchContext;
use crate::core::Result;
use futures::stream::BoxStream;
use std::collections::VecDeque;
use std::sync::Arc;

/// A request whose response is a lazy sequence of items.
pub trait StreamRequest: Send + Sync + 'static {
    type Item: Send + 'static;

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Terminal stage of a streaming pipeline.
///
/// The context arrives by value: the produced stream is `'static` and
/// outlives the dispatch call that built it.
pub trait StreamHandler<R: StreamRequest>: Send + Sync {
    fn handle(&self, request: R, ctx: DispatchContext) -> BoxStream<'static, Result<R::Item>>;
}

/// A cross-cutting stage wrapping a streaming continuation.
pub trait StreamBehavior<R: StreamRequest>: Send + Sync {
    fn handle(
        &self,
        request: R,
        next: StreamNext<R>,
        ctx: DispatchContext,
    ) -> BoxStream<'static, Result<R::Item>>;
}

/// Owned continuation of a streaming pipeline: the remaining behaviors
/// plus the terminal handler.
pub struct StreamNext<R: StreamRequest> {
    behaviors: VecDeque<Arc<dyn StreamBehavior<R>>>,
    handler: Arc<dyn StreamHandler<R>>,
    ctx: DispatchContext,
}

impl<R: StreamRequest> StreamNext<R> {
    pub(super) fn new(
        behaviors: Vec<Arc<dyn StreamBehavior<R>>>,
        handler: Arc<dyn StreamHandler<R>>,
        ctx: DispatchContext,
    ) -> Self {
        Self {
            behaviors: behaviors.into(),
            handler,
            ctx,
        }
    }

    /// Produces the inner sequence: the next behavior's stream, or the
    /// handler's once the behavior list is exhausted.
    pub fn run(mut self, request: R) -> BoxStream<'static, Result<R::Item>> {
        let ctx = self.ctx.clone();
        match self.behaviors.pop_front() {
            Some(head) => head.handle(request, self, ctx),
            None => self.handler.handle(request, ctx),
        }
    }
}
