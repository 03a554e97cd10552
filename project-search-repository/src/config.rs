//! Configuration types for the `ProjectSearchService`.

use std::time::Duration;

/// Default deadline for a single search round-trip, in milliseconds.
pub const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 5000;

/// Configuration for the `ProjectSearchService`.
#[derive(Debug, Clone)]
pub struct SearchServiceConfig {
    /// Deadline applied to each call into the index gateway.
    pub search_timeout: Duration,
}

impl Default for SearchServiceConfig {
    fn default() -> Self {
        Self {
            search_timeout: Duration::from_millis(DEFAULT_SEARCH_TIMEOUT_MS),
        }
    }
}

impl SearchServiceConfig {
    /// Create a config with a custom gateway deadline.
    pub fn with_timeout(search_timeout: Duration) -> Self {
        Self { search_timeout }
    }
}
