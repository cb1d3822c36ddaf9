use crate::core::Result;
use crate::mediator::request::{LogOptions, PipelineBehavior, Request};
use crate::mediator::{DispatchContext, Next};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Structured request logging with field redaction.
///
/// Logs the request payload (minus the fields the request excludes)
/// and the acting identity before the chain runs, and the outcome
/// after. A request that cannot be serialized is logged by name only;
/// logging never fails the request.
#[derive(Clone, Default)]
pub struct LoggingBehavior;

impl LoggingBehavior {
    pub fn new() -> Self {
        Self
    }
}

fn render<R: Serialize>(request: &R, opts: &LogOptions) -> String {
    match serde_json::to_value(request) {
        Ok(mut value) => {
            if let Value::Object(map) = &mut value {
                for field in &opts.exclude {
                    map.remove(*field);
                }
            }
            value.to_string()
        }
        Err(_) => "<unserializable>".to_string(),
    }
}

#[async_trait]
impl<R> PipelineBehavior<R> for LoggingBehavior
where
    R: Request + Serialize,
{
    async fn handle(
        &self,
        request: R,
        next: Next<'_, R>,
        ctx: &DispatchContext,
    ) -> Result<R::Response> {
        let Some(opts) = request.log_options() else {
            return next.run(request).await;
        };

        let name = request.name();
        let actor = ctx
            .identity()
            .map(|identity| identity.display_name().to_string())
            .unwrap_or_else(|| "<no identity>".to_string());
        let payload = render(&request, &opts);
        tracing::info!(request = name, actor = %actor, payload = %payload, "handling request");

        let result = next.run(request).await;
        match &result {
            Ok(_) => tracing::info!(request = name, actor = %actor, "request completed"),
            Err(err) => {
                tracing::info!(request = name, actor = %actor, error = %err, "request failed")
            }
        }
        result
    }
}
