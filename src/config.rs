use crate::identity::IdentityMode;
use std::time::Duration;

/// Mediator-wide configuration.
///
/// Chainable builder methods, consumed by [`MediatorBuilder::config`].
///
/// [`MediatorBuilder::config`]: crate::mediator::MediatorBuilder::config
#[derive(Debug, Clone)]
pub struct MediatorConfig {
    identity_mode: IdentityMode,
    cache_expiration: Duration,
    slow_request_threshold: Duration,
}

impl MediatorConfig {
    pub fn new() -> Self {
        Self {
            identity_mode: IdentityMode::default(),
            cache_expiration: Duration::from_secs(300),
            slow_request_threshold: Duration::from_millis(500),
        }
    }

    pub fn identity_mode(mut self, mode: IdentityMode) -> Self {
        self.identity_mode = mode;
        self
    }

    /// Default sliding expiration for cached responses whose request
    /// does not specify one.
    pub fn cache_expiration(mut self, expiration: Duration) -> Self {
        self.cache_expiration = expiration;
        self
    }

    /// Elapsed time beyond which a tracked request is logged as slow,
    /// for requests that do not specify their own threshold.
    pub fn slow_request_threshold(mut self, threshold: Duration) -> Self {
        self.slow_request_threshold = threshold;
        self
    }

    pub fn get_identity_mode(&self) -> IdentityMode {
        self.identity_mode
    }

    pub fn get_cache_expiration(&self) -> Duration {
        self.cache_expiration
    }

    pub fn get_slow_request_threshold(&self) -> Duration {
        self.slow_request_threshold
    }
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chains() {
        let config = MediatorConfig::new()
            .identity_mode(IdentityMode::Strict)
            .cache_expiration(Duration::from_secs(30))
            .slow_request_threshold(Duration::from_millis(100));
        assert_eq!(config.get_identity_mode(), IdentityMode::Strict);
        assert_eq!(config.get_cache_expiration(), Duration::from_secs(30));
        assert_eq!(
            config.get_slow_request_threshold(),
            Duration::from_millis(100)
        );
    }
}
