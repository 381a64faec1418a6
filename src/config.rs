//! Configuration Module
//!
//! Handles the three cache parameters: TTL, minimum and maximum byte size.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

// == Defaults ==
/// Default TTL in seconds
pub const DEFAULT_TTL_SECS: u64 = 30;

/// Default lower size bound in bytes (1 MiB)
pub const DEFAULT_MIN_BYTES: u64 = 1 << 20;

/// Default upper size bound in bytes (128 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 128 << 20;

/// Cache configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Time-to-live in seconds, refreshed on every put and successful get
    pub ttl_secs: u64,
    /// Lower size bound in bytes
    pub min_bytes: u64,
    /// Upper size bound in bytes; reaching it triggers a collapse pass
    pub max_bytes: u64,
}

impl CacheConfig {
    /// Builds a config from up to three positional values, in the order
    /// `ttl_secs`, `min_bytes`, `max_bytes`. Missing trailing values take
    /// their defaults.
    ///
    /// # Errors
    /// `CacheError::TooManyParams` when more than three values are given.
    pub fn from_params(params: &[u64]) -> Result<Self> {
        if params.len() > 3 {
            return Err(CacheError::TooManyParams(params.len()));
        }

        let defaults = Self::default();
        Ok(Self {
            ttl_secs: params.first().copied().unwrap_or(defaults.ttl_secs),
            min_bytes: params.get(1).copied().unwrap_or(defaults.min_bytes),
            max_bytes: params.get(2).copied().unwrap_or(defaults.max_bytes),
        })
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_SECS` - TTL in seconds (default: 30)
    /// - `CACHE_MIN_BYTES` - Lower size bound (default: 1 MiB)
    /// - `CACHE_MAX_BYTES` - Upper size bound (default: 128 MiB)
    pub fn from_env() -> Self {
        Self {
            ttl_secs: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TTL_SECS),
            min_bytes: env::var("CACHE_MIN_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MIN_BYTES),
            max_bytes: env::var("CACHE_MAX_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BYTES),
        }
    }

    /// TTL as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    // == Sweep Interval ==
    /// Period of the expiry sweep: `floor(sqrt(ttl))` seconds, never
    /// below one second.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(isqrt(self.ttl_secs).max(1))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            min_bytes: DEFAULT_MIN_BYTES,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Integer square root, rounded down.
fn isqrt(n: u64) -> u64 {
    let mut root = (n as f64).sqrt() as u64;
    // float rounding can be off by one near perfect squares
    while root.checked_mul(root).map_or(true, |sq| sq > n) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).map_or(false, |sq| sq <= n) {
        root += 1;
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_secs, 30);
        assert_eq!(config.min_bytes, 1024 * 1024);
        assert_eq!(config.max_bytes, 128 * 1024 * 1024);
    }

    #[test]
    fn test_from_params_empty_uses_defaults() {
        assert_eq!(CacheConfig::from_params(&[]).unwrap(), CacheConfig::default());
    }

    #[test]
    fn test_from_params_positional_order() {
        let config = CacheConfig::from_params(&[5]).unwrap();
        assert_eq!(config.ttl_secs, 5);
        assert_eq!(config.min_bytes, DEFAULT_MIN_BYTES);
        assert_eq!(config.max_bytes, DEFAULT_MAX_BYTES);

        let config = CacheConfig::from_params(&[5, 10, 2048]).unwrap();
        assert_eq!(config.ttl_secs, 5);
        assert_eq!(config.min_bytes, 10);
        assert_eq!(config.max_bytes, 2048);
    }

    #[test]
    fn test_from_params_too_many() {
        let result = CacheConfig::from_params(&[1, 2, 3, 4]);
        assert_eq!(result, Err(CacheError::TooManyParams(4)));
    }

    #[test]
    fn test_from_params_accepts_any_values() {
        let config = CacheConfig::from_params(&[0]).unwrap();
        assert_eq!(config.ttl_secs, 0);
        assert_eq!(config.sweep_interval(), Duration::from_secs(1));

        // min above the default max is stored as given
        let config = CacheConfig::from_params(&[30, 200 << 20]).unwrap();
        assert_eq!(config.min_bytes, 200 << 20);
        assert_eq!(config.max_bytes, DEFAULT_MAX_BYTES);

        let config = CacheConfig::from_params(&[u64::MAX, u64::MAX, 0]).unwrap();
        assert_eq!(config.ttl(), Duration::from_secs(u64::MAX));
        assert_eq!(config.max_bytes, 0);
    }

    #[test]
    fn test_sweep_interval() {
        let interval = |ttl_secs| CacheConfig { ttl_secs, ..CacheConfig::default() }.sweep_interval();

        assert_eq!(interval(30), Duration::from_secs(5));
        assert_eq!(interval(1), Duration::from_secs(1));
        assert_eq!(interval(3), Duration::from_secs(1));
        assert_eq!(interval(4), Duration::from_secs(2));
        assert_eq!(interval(3600), Duration::from_secs(60));
        // bounded below so the timer never spins
        assert_eq!(interval(0), Duration::from_secs(1));
    }

    #[test]
    fn test_isqrt_near_perfect_squares() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(17), 4);
        assert_eq!(isqrt(u64::MAX), 4_294_967_295);
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("CACHE_TTL_SECS");
        env::remove_var("CACHE_MIN_BYTES");
        env::remove_var("CACHE_MAX_BYTES");

        assert_eq!(CacheConfig::from_env(), CacheConfig::default());
    }
}
