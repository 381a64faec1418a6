//! Cache Module
//!
//! In-memory caching with LRU ordering, byte-size bounding and TTL expiry.

mod engine;
mod entry;
mod lru;
mod size;
mod store;


// Re-export public types
pub use engine::Cache;
pub use entry::{deadline, Entry, Footprint, ENTRY_OVERHEAD, FAR_FUTURE};
pub use lru::RecencyIndex;
pub use size::SizeAccountant;
pub use store::CacheStore;
