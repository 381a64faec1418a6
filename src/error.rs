//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Raised only while building a cache from positional parameters. Once a
/// cache exists its operations are total: misses and expired keys are
/// reported through `Option`, never through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// More positional parameters than the three recognised slots
    #[error("Invalid configuration: expected at most 3 parameters (ttl, min_bytes, max_bytes), got {0}")]
    TooManyParams(usize),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
