use crate::cache::CacheStore;
use crate::core::Result;
use crate::mediator::request::{PipelineBehavior, Request};
use crate::mediator::{DispatchContext, Next};
use async_trait::async_trait;
use std::sync::Arc;

/// Cache invalidation after a successful mutation.
///
/// Runs the rest of the chain first; only a successful result triggers
/// removal of the advertised groups (every key in the group's key-set,
/// then the key-set itself) and individual keys. A failed request
/// leaves the cache untouched.
#[derive(Clone)]
pub struct CacheRemovingBehavior {
    cache: Arc<dyn CacheStore>,
}

impl CacheRemovingBehavior {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl<R> PipelineBehavior<R> for CacheRemovingBehavior
where
    R: Request,
{
    async fn handle(
        &self,
        request: R,
        next: Next<'_, R>,
        _ctx: &DispatchContext,
    ) -> Result<R::Response> {
        let Some(opts) = request.cache_invalidation() else {
            return next.run(request).await;
        };

        let response = next.run(request).await?;

        for group in &opts.groups {
            let keys = super::load_group(self.cache.as_ref(), group).await?;
            for key in &keys {
                self.cache.remove(key).await?;
            }
            self.cache.remove(group).await?;
            tracing::debug!(group, removed = keys.len(), "cache group invalidated");
        }
        for key in &opts.keys {
            self.cache.remove(key).await?;
        }

        Ok(response)
    }
}
