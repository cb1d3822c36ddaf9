//! Event publication contracts.
//!
//! Unlike requests, events fan out: every registered handler runs,
//! concurrently, and failures are aggregated rather than
//! short-circuiting the rest.

use super::DispatchContext;
use crate::core::Result;
use async_trait::async_trait;

/// A published notification. Zero registered handlers is a legal
/// state, not a configuration error.
pub trait Event: Send + Sync + 'static {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
pub trait EventHandler<E: Event>: Send + Sync {
    async fn handle(&self, event: &E, ctx: &DispatchContext) -> Result<()>;
}
