//! Size Accountant Module
//!
//! Running byte total of the cache compared against the configured bounds.

// == Size Accountant ==
/// Tracks the summed footprint of all live entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeAccountant {
    current_bytes: u64,
    min_bytes: u64,
    max_bytes: u64,
}

impl SizeAccountant {
    // == Constructor ==
    pub fn new(min_bytes: u64, max_bytes: u64) -> Self {
        Self {
            current_bytes: 0,
            min_bytes,
            max_bytes,
        }
    }

    /// Adds one entry's footprint to the total.
    pub fn add(&mut self, bytes: u64) {
        self.current_bytes += bytes;
    }

    /// Subtracts one entry's footprint from the total.
    pub fn sub(&mut self, bytes: u64) {
        debug_assert!(bytes <= self.current_bytes, "size accounting underflow");
        self.current_bytes = self.current_bytes.saturating_sub(bytes);
    }

    pub fn current_bytes(&self) -> u64 {
        self.current_bytes
    }

    pub fn min_bytes(&self) -> u64 {
        self.min_bytes
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// True once the total has reached the upper bound; a collapse pass
    /// should be requested.
    pub fn at_limit(&self) -> bool {
        self.current_bytes >= self.max_bytes
    }

    /// True while the total is strictly above the upper bound; a collapse
    /// pass keeps evicting.
    pub fn over_limit(&self) -> bool {
        self.current_bytes > self.max_bytes
    }
}
