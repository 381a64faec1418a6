//! Background Tasks Module
//!
//! Contains the background task that runs alongside each cache.
//!
//! # Tasks
//! - Eviction Sweeper: collapses the cache on overflow and purges expired
//!   entries at the configured interval

mod sweeper;

pub use sweeper::{spawn_sweeper, SweeperSignals, SweeperState};
