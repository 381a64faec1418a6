//! Cache Engine Module
//!
//! Thread-safe cache handle: the store behind one read/write lock plus the
//! eviction sweeper that runs beside it.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, Footprint};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::{spawn_sweeper, SweeperSignals};

// == Cache ==
/// An in-process cache bounded by total footprint and expiring entries
/// after a TTL of inactivity.
///
/// `put`, `get` and `remove` take the write lock (lookups reorder the
/// recency list); `display` and the size accessors take the read lock.
/// Eviction is done by a background sweeper owned by this handle, which
/// must be stopped with [`Cache::shutdown`]. Dropping the handle without
/// shutting down still signals the sweeper to exit, but does not wait.
pub struct Cache<K, V> {
    store: Arc<RwLock<CacheStore<K, V>>>,
    signals: Arc<SweeperSignals>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    config: CacheConfig,
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + Footprint + Send + Sync + 'static,
    V: Clone + Footprint + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache and starts its sweeper.
    ///
    /// Must be called from within a tokio runtime. Every value combination
    /// is accepted: a zero TTL expires entries on arrival, and `min_bytes`
    /// is stored as given.
    pub fn new(config: CacheConfig) -> Self {
        if config.ttl_secs == 0 {
            warn!("Cache created with ttl=0s: every entry is expired on arrival");
        }
        if config.min_bytes > config.max_bytes {
            warn!(
                "Cache created with min_bytes={} above max_bytes={}",
                config.min_bytes, config.max_bytes
            );
        }

        let store = Arc::new(RwLock::new(CacheStore::new(&config)));
        let signals = Arc::new(SweeperSignals::new());
        let handle = spawn_sweeper(store.clone(), signals.clone(), config.sweep_interval());

        info!(
            "Cache created: ttl={}s, min_bytes={}, max_bytes={}",
            config.ttl_secs, config.min_bytes, config.max_bytes
        );

        Self {
            store,
            signals,
            sweeper: Mutex::new(Some(handle)),
            config,
        }
    }

    /// Creates a cache from up to three positional values:
    /// `ttl_secs`, `min_bytes`, `max_bytes`.
    ///
    /// # Errors
    /// `CacheError::TooManyParams` for more than three values; the sweeper
    /// is not started in that case.
    ///
    /// # Example
    /// ```ignore
    /// let cache: Cache<u32, String> = Cache::with_params(&[3])?;
    /// ```
    pub fn with_params(params: &[u64]) -> Result<Self> {
        Ok(Self::new(CacheConfig::from_params(params)?))
    }

    // == Put ==
    /// Stores a key-value pair as the most recently used entry and resets
    /// its TTL. Requests a collapse pass once the byte budget is reached.
    pub async fn put(&self, key: K, value: V) {
        let at_limit = {
            let mut store = self.store.write().await;
            store.put(key, value, Instant::now())
        };

        if at_limit {
            self.signals.notify_overflow();
        }
    }

    // == Get ==
    /// Returns the value if present and not expired, marking it most
    /// recently used and resetting its TTL.
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut store = self.store.write().await;
        store.get(key, Instant::now()).cloned()
    }

    // == Remove ==
    /// Removes a key, returning its value if it was stored.
    pub async fn remove(&self, key: &K) -> Option<V> {
        let mut store = self.store.write().await;
        store.remove(key)
    }

    // == Shutdown ==
    /// Stops the sweeper and waits for it to exit.
    ///
    /// Calling it again is a no-op. A second call made while the first is
    /// still waiting returns at once, without waiting for the sweeper.
    pub async fn shutdown(&self) {
        let Some(handle) = self.sweeper.lock().await.take() else {
            debug!("Cache already shut down");
            return;
        };

        self.signals.notify_shutdown();
        if let Err(e) = handle.await {
            warn!("Eviction sweeper ended abnormally: {}", e);
        }
        info!("Cache shut down");
    }

    /// Returns true once `shutdown` has completed or begun.
    pub async fn is_shut_down(&self) -> bool {
        self.sweeper.lock().await.is_none()
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Summed footprint of all stored entries.
    pub async fn current_bytes(&self) -> u64 {
        self.store.read().await.current_bytes()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Period of the expiry sweep.
    pub fn sweep_interval(&self) -> Duration {
        self.config.sweep_interval()
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + Footprint + fmt::Display + Send + Sync + 'static,
    V: Clone + Footprint + fmt::Display + Send + Sync + 'static,
{
    // == Display ==
    /// Renders the contents from most to least recently used as
    /// `{{k1: v1}, {k2: v2}}`.
    pub async fn dump(&self) -> String {
        self.store.read().await.to_string()
    }

    /// Prints the contents to stdout.
    pub async fn display(&self) {
        println!("{}", self.dump().await);
    }
}

impl<K, V> Drop for Cache<K, V> {
    fn drop(&mut self) {
        self.signals.notify_shutdown();
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache").field("config", &self.config).finish_non_exhaustive()
    }
}
