//! Engine configuration.

use std::time::Duration;

/// Configuration for the resolution engine and its services.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Per-lookup timeout applied to every store call in the resolution
    /// pipeline (default: 5 seconds).
    pub lookup_timeout: Duration,
    /// TTL for cached search-backend URLs (default: 300 seconds).
    pub backend_cache_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lookup_timeout: Duration::from_secs(5),
            backend_cache_ttl: Duration::from_secs(300),
        }
    }
}
