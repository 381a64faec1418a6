//! LRU TTL Cache - A bounded in-process cache
//!
//! Evicts entries by least-recent use once a byte budget is reached, and
//! expires entries that have not been accessed within their TTL.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, Footprint};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
