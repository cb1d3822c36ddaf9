use crate::core::{AppError, Result};
use crate::identity::ADMIN_ROLE;
use crate::mediator::request::{PipelineBehavior, Request};
use crate::mediator::{DispatchContext, Next};
use async_trait::async_trait;

/// Role-based authorization.
///
/// Missing identity context and insufficient identity are distinct
/// failures: the former is an authentication error (strict identity
/// mode with no context), the latter an authorization error. The
/// `admin` claim satisfies any requirement. Both failures are terminal
/// for the request.
#[derive(Clone, Default)]
pub struct AuthorizationBehavior;

impl AuthorizationBehavior {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<R> PipelineBehavior<R> for AuthorizationBehavior
where
    R: Request,
{
    async fn handle(
        &self,
        request: R,
        next: Next<'_, R>,
        ctx: &DispatchContext,
    ) -> Result<R::Response> {
        let Some(requirement) = request.auth_requirement() else {
            return next.run(request).await;
        };

        let Some(identity) = ctx.identity() else {
            return Err(AppError::Authentication(
                "no identity context available for a secured request".to_string(),
            ));
        };

        let authorized = requirement.roles.is_empty()
            || identity.has_role(ADMIN_ROLE)
            || requirement.roles.iter().any(|role| identity.has_role(role));

        if authorized {
            next.run(request).await
        } else {
            Err(AppError::Authorization(format!(
                "identity '{}' lacks a required role",
                identity.display_name()
            )))
        }
    }
}
