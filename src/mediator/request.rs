//! Request, handler and behavior contracts.
//!
//! A request is an immutable value tagged by type; its handler is
//! resolved by exact type match. Cross-cutting options are capability
//! markers: optional, explicitly-checked accessors a request may
//! override. Behaviors probe the capability and call straight through
//! when it is absent.

use super::{DispatchContext, Next};
use crate::core::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Options advertised by a cacheable request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    /// Cache key for the response.
    pub key: String,
    /// Named group this key joins, for group-wide invalidation.
    pub group: Option<String>,
    /// Sliding expiration; the configured default applies when absent.
    pub sliding_expiration: Option<Duration>,
    /// Skip the cache entirely: the handler always runs and the cached
    /// value under `key` is left untouched.
    pub bypass: bool,
}

impl CacheOptions {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            group: None,
            sliding_expiration: None,
            bypass: false,
        }
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn sliding_expiration(mut self, expiration: Duration) -> Self {
        self.sliding_expiration = Some(expiration);
        self
    }

    pub fn bypass(mut self) -> Self {
        self.bypass = true;
        self
    }
}

/// Options advertised by a request that invalidates cached data after
/// it succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheInvalidationOptions {
    /// Groups whose entire key-sets are removed.
    pub groups: Vec<String>,
    /// Individual keys removed in addition to the groups.
    pub keys: Vec<String>,
}

impl CacheInvalidationOptions {
    pub fn groups(groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            groups: groups.into_iter().map(Into::into).collect(),
            keys: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.keys.push(key.into());
        self
    }
}

/// Role claims required by a secured request. An empty role list means
/// any authenticated (or anonymous-marker) identity passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthRequirement {
    pub roles: Vec<String>,
}

impl AuthRequirement {
    pub fn roles(roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Options advertised by a loggable request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Field names redacted from the logged request payload.
    pub exclude: Vec<&'static str>,
}

impl LogOptions {
    pub fn excluding(exclude: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            exclude: exclude.into_iter().collect(),
        }
    }
}

/// Options advertised by a performance-tracked request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerformanceOptions {
    /// Elapsed time beyond which the request is logged as slow. The
    /// configured default threshold applies when absent.
    pub warn_after: Option<Duration>,
}

impl PerformanceOptions {
    pub fn warn_after(threshold: Duration) -> Self {
        Self {
            warn_after: Some(threshold),
        }
    }
}

/// A dispatchable request with a typed response.
///
/// The capability accessors default to `None`; a request opts into a
/// cross-cutting behavior by overriding the matching accessor. A
/// request may satisfy any number of capabilities at once.
pub trait Request: Send + Sync + 'static {
    type Response: Send + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn cache_options(&self) -> Option<CacheOptions> {
        None
    }

    fn cache_invalidation(&self) -> Option<CacheInvalidationOptions> {
        None
    }

    fn auth_requirement(&self) -> Option<AuthRequirement> {
        None
    }

    fn log_options(&self) -> Option<LogOptions> {
        None
    }

    fn performance_options(&self) -> Option<PerformanceOptions> {
        None
    }
}

/// Terminal stage of a pipeline: exactly one per request type.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(&self, request: R, ctx: &DispatchContext) -> Result<R::Response>;
}

/// A cross-cutting pipeline stage wrapping a continuation.
///
/// A behavior may run code before and after `next.run(request)`, may
/// skip `next` entirely (short-circuit: everything further inside never
/// executes and this behavior's return value becomes the pipeline's
/// result), and sees errors from inner stages surface out of `next`.
/// It may observe them; recovery is an explicit choice that makes it
/// responsible for any invariant it broke.
#[async_trait]
pub trait PipelineBehavior<R: Request>: Send + Sync {
    async fn handle(
        &self,
        request: R,
        next: Next<'_, R>,
        ctx: &DispatchContext,
    ) -> Result<R::Response>;
}
