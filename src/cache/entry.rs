//! Cache Entry Module
//!
//! Defines a single cache entry with its expiry instant, and the footprint
//! estimate used for size accounting.

use std::mem::size_of;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

// == Footprint ==
/// Fixed per-entry cost in bytes: slot links, the expiry instant and the
/// index map bookkeeping.
pub const ENTRY_OVERHEAD: u64 = 64;

/// Estimated heap and inline size of a key or value, in bytes.
///
/// Implementations must be deterministic: the same value always reports
/// the same footprint, since the accountant subtracts exactly what it added.
pub trait Footprint {
    fn footprint(&self) -> u64;
}

impl Footprint for str {
    fn footprint(&self) -> u64 {
        self.len() as u64
    }
}

impl Footprint for String {
    fn footprint(&self) -> u64 {
        self.len() as u64
    }
}

impl Footprint for Vec<u8> {
    fn footprint(&self) -> u64 {
        self.len() as u64
    }
}

impl Footprint for [u8] {
    fn footprint(&self) -> u64 {
        self.len() as u64
    }
}

impl<T: Footprint + ?Sized> Footprint for Box<T> {
    fn footprint(&self) -> u64 {
        (**self).footprint()
    }
}

impl<T: Footprint + ?Sized> Footprint for Arc<T> {
    fn footprint(&self) -> u64 {
        (**self).footprint()
    }
}

macro_rules! fixed_footprint {
    ($($t:ty),*) => {
        $(
            impl Footprint for $t {
                fn footprint(&self) -> u64 {
                    size_of::<$t>() as u64
                }
            }
        )*
    };
}

fixed_footprint!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, char, bool);

// == Deadline ==
/// Roughly 30 years; stands in for "never" when `now + ttl` overflows.
pub const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + ttl`, saturating at `now + FAR_FUTURE` for TTLs too large to
/// represent as an instant.
pub fn deadline(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

// == Cache Entry ==
/// A stored key/value pair and the instant after which it is expired.
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
    pub expiry: Instant,
}

impl<K: Footprint, V: Footprint> Entry<K, V> {
    // == Constructor ==
    /// Creates an entry expiring `ttl` after `now`.
    pub fn new(key: K, value: V, now: Instant, ttl: Duration) -> Self {
        Self {
            key,
            value,
            expiry: deadline(now, ttl),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now` has reached its expiry instant.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expiry <= now
    }

    /// Pushes the expiry out to `now + ttl`.
    pub fn refresh(&mut self, now: Instant, ttl: Duration) {
        self.expiry = deadline(now, ttl);
    }

    /// Estimated byte cost of this entry.
    pub fn footprint(&self) -> u64 {
        ENTRY_OVERHEAD + self.key.footprint() + self.value.footprint()
    }
}
