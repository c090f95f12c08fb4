//! Per-IP Rate Limiting
//!
//! GCRA-based limiting via tower_governor, keyed by peer IP. The server
//! must be started with `into_make_service_with_connect_info::<SocketAddr>()`
//! so the key extractor can see client addresses. Responses carry
//! `X-RateLimit-*` headers for quota visibility.

use crate::config::RateLimitSettings;
use governor::middleware::StateInformationMiddleware;
use std::sync::Arc;
use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::PeerIpKeyExtractor;

/// Governor config with rate-limit headers enabled
pub type ApiGovernorConfig = GovernorConfig<PeerIpKeyExtractor, StateInformationMiddleware>;

/// Build the governor config from the service settings
pub fn governor_config(settings: &RateLimitSettings) -> Arc<ApiGovernorConfig> {
    Arc::new(
        GovernorConfigBuilder::default()
            .per_second(settings.per_second)
            .burst_size(settings.burst_size)
            .use_headers()
            .finish()
            .unwrap(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_governor_config_builds() {
        let settings = RateLimitSettings {
            per_second: 1,
            burst_size: 30,
        };
        let config = governor_config(&settings);
        assert!(Arc::strong_count(&config) > 0);
    }
}
