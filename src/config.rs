//! Cache configuration.

use crate::storage::ExpiryConfig;
use std::time::Duration;

/// Time-to-live applied by [`Cache::set`](crate::Cache::set) and by every
/// collection or counter write-back (30 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(1800);

/// Configuration for a [`Cache`](crate::Cache).
///
/// # Example
///
/// ```
/// use zcache::CacheConfig;
/// use std::time::Duration;
///
/// let config = CacheConfig::default().with_default_ttl(Duration::from_secs(60));
/// assert_eq!(config.default_ttl, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL used when a write does not specify one
    pub default_ttl: Duration,

    /// Settings for the background expiry sweeper
    pub expiry: ExpiryConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            expiry: ExpiryConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the TTL used for writes that don't specify one.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets the expiry sweeper configuration.
    pub fn with_expiry(mut self, expiry: ExpiryConfig) -> Self {
        self.expiry = expiry;
        self
    }
}
