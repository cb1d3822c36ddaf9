use crate::cache::CacheStore;
use crate::core::{AppError, Result};
use crate::mediator::request::{PipelineBehavior, Request};
use crate::mediator::{DispatchContext, Next};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Response caching.
///
/// On a hit the handler (and everything further inside the chain) never
/// runs. A cached payload that fails to deserialize is a logged miss,
/// never an error to the caller. A cache *write* failure propagates:
/// the response was computed, but the pipeline must not pretend the
/// write happened.
#[derive(Clone)]
pub struct CachingBehavior {
    cache: Arc<dyn CacheStore>,
}

impl CachingBehavior {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl<R> PipelineBehavior<R> for CachingBehavior
where
    R: Request,
    R::Response: Serialize + DeserializeOwned,
{
    async fn handle(
        &self,
        request: R,
        next: Next<'_, R>,
        ctx: &DispatchContext,
    ) -> Result<R::Response> {
        let Some(opts) = request.cache_options() else {
            return next.run(request).await;
        };
        if opts.bypass {
            // Bypass never touches the stored value under the key.
            tracing::debug!(key = %opts.key, "cache bypassed");
            return next.run(request).await;
        }

        if let Some(bytes) = self.cache.get(&opts.key).await? {
            match rmp_serde::from_slice::<R::Response>(&bytes) {
                Ok(response) => {
                    tracing::debug!(key = %opts.key, "cache hit");
                    return Ok(response);
                }
                Err(err) => {
                    tracing::warn!(key = %opts.key, error = %err, "corrupt cache payload, treating as miss");
                }
            }
        }

        let response = next.run(request).await?;

        let expiration = Some(
            opts.sliding_expiration
                .unwrap_or_else(|| ctx.config().get_cache_expiration()),
        );
        let payload =
            rmp_serde::to_vec(&response).map_err(|err| AppError::Serialization(err.to_string()))?;
        self.cache.set(&opts.key, payload, expiration).await?;
        tracing::debug!(key = %opts.key, "response cached");

        if let Some(group) = &opts.group {
            let mut keys = super::load_group(self.cache.as_ref(), group).await?;
            keys.insert(opts.key.clone());
            super::store_group(self.cache.as_ref(), group, &keys, expiration).await?;
        }

        Ok(response)
    }
}
