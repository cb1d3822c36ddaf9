use crate::core::Result;
use crate::mediator::request::{PipelineBehavior, Request};
use crate::mediator::{DispatchContext, Next};
use async_trait::async_trait;
use std::time::Instant;

/// Elapsed-time tracking.
///
/// The timer is read on the success and the failure path alike; an
/// error surfacing out of `next` still gets its duration observed
/// before it propagates.
#[derive(Clone, Default)]
pub struct PerformanceBehavior;

impl PerformanceBehavior {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<R> PipelineBehavior<R> for PerformanceBehavior
where
    R: Request,
{
    async fn handle(
        &self,
        request: R,
        next: Next<'_, R>,
        ctx: &DispatchContext,
    ) -> Result<R::Response> {
        let Some(opts) = request.performance_options() else {
            return next.run(request).await;
        };
        let threshold = opts
            .warn_after
            .unwrap_or_else(|| ctx.config().get_slow_request_threshold());

        let name = request.name();
        let started = Instant::now();
        let result = next.run(request).await;
        let elapsed = started.elapsed();

        if elapsed > threshold {
            tracing::warn!(
                request = name,
                elapsed_ms = elapsed.as_millis() as u64,
                threshold_ms = threshold.as_millis() as u64,
                "slow request"
            );
        } else {
            tracing::debug!(
                request = name,
                elapsed_ms = elapsed.as_millis() as u64,
                "request timed"
            );
        }

        result
    }
}
