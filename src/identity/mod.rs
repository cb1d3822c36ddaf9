//! Identity/context source.
//!
//! Supplies the current actor's role claims and display name to the
//! authorization and logging behaviors. How identity reaches the
//! provider (HTTP context, CLI flags, ...) is the host's business.

use std::sync::Arc;

/// Role claim that satisfies any role requirement.
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    display_name: String,
    roles: Vec<String>,
    anonymous: bool,
}

impl Identity {
    pub fn new(display_name: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            display_name: display_name.into(),
            roles,
            anonymous: false,
        }
    }

    /// The marker identity used in permissive mode when no context is
    /// available.
    pub fn anonymous() -> Self {
        Self {
            display_name: "anonymous".into(),
            roles: Vec::new(),
            anonymous: true,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|claim| claim == role)
    }
}

/// How a missing identity context is treated at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityMode {
    /// Missing context surfaces as an authentication error when a
    /// secured request reaches the authorization behavior.
    Strict,
    /// Missing context defaults to the anonymous marker.
    #[default]
    Permissive,
}

pub trait IdentityProvider: Send + Sync {
    /// Snapshot of the current actor, if any context is available.
    fn current(&self) -> Option<Identity>;
}

/// Fixed-identity provider, for hosts that resolve identity up front
/// and for tests.
pub struct StaticIdentityProvider {
    identity: Option<Identity>,
}

impl StaticIdentityProvider {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    /// A provider with no identity context at all.
    pub fn empty() -> Self {
        Self { identity: None }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn current(&self) -> Option<Identity> {
        self.identity.clone()
    }
}

pub type SharedIdentityProvider = Arc<dyn IdentityProvider>;
