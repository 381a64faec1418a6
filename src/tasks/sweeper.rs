//! Eviction Sweeper Task
//!
//! Background task that evicts from the least recently used end of the
//! cache, either because the byte budget was reached or because the
//! periodic expiry timer fired.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::cache::{deadline, CacheStore, Footprint};

/// What the sweeper is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweeperState {
    Idle,
    /// Overflow-triggered eviction down to `max_bytes`
    Collapsing,
    /// Timer-triggered expiry pass
    Sweeping,
    Stopped,
}

impl fmt::Display for SweeperState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SweeperState::Idle => "idle",
            SweeperState::Collapsing => "collapsing",
            SweeperState::Sweeping => "sweeping",
            SweeperState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

// == Sweeper Signals ==
/// Wake-up channels shared between a cache and its sweeper.
///
/// Both are `Notify`s, which hold at most one pending permit: an overflow
/// signal posted while another is still pending is absorbed, not queued.
#[derive(Debug, Default)]
pub struct SweeperSignals {
    overflow: Notify,
    shutdown: Notify,
}

impl SweeperSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a collapse pass. Never blocks.
    pub fn notify_overflow(&self) {
        trace!("Overflow signal posted");
        self.overflow.notify_one();
    }

    /// Asks the sweeper to stop. Never blocks.
    pub fn notify_shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// Spawns the sweeper for `cache`.
///
/// The task runs until `signals.notify_shutdown()` is called, multiplexing
/// three triggers:
/// - overflow signal: collapse pass, evicting while over `max_bytes`
/// - timer tick every `sweep_interval`: expiry pass from the back
/// - shutdown signal: exit
///
/// Each pass holds the write lock for its whole duration. Awaiting the
/// returned handle waits for the task to stop.
pub fn spawn_sweeper<K, V>(
    cache: Arc<RwLock<CacheStore<K, V>>>,
    signals: Arc<SweeperSignals>,
    sweep_interval: Duration,
) -> JoinHandle<()>
where
    K: Hash + Eq + Clone + Footprint + Send + Sync + 'static,
    V: Footprint + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            "Starting eviction sweeper with interval of {} seconds",
            sweep_interval.as_secs()
        );

        // first tick one full interval from now, not immediately
        let mut ticker = time::interval_at(deadline(Instant::now(), sweep_interval), sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut state = SweeperState::Idle;

        loop {
            tokio::select! {
                // shutdown wins over pending work
                biased;

                _ = signals.shutdown.notified() => {
                    state = SweeperState::Stopped;
                    break;
                }
                _ = signals.overflow.notified() => {
                    state = SweeperState::Collapsing;
                    let (removed, current_bytes) = {
                        let mut store = cache.write().await;
                        (store.collapse(), store.current_bytes())
                    };
                    debug!(
                        state = %state,
                        removed,
                        current_bytes,
                        "Collapse pass finished"
                    );
                }
                _ = ticker.tick() => {
                    state = SweeperState::Sweeping;
                    let removed = {
                        let mut store = cache.write().await;
                        store.sweep_expired(Instant::now())
                    };
                    if removed > 0 {
                        info!("Expiry sweep: removed {} expired entries", removed);
                    } else {
                        debug!(state = %state, "Expiry sweep: no expired entries found");
                    }
                }
            }
            state = SweeperState::Idle;
            trace!(state = %state, "Sweeper waiting");
        }

        info!(state = %state, "Eviction sweeper stopped");
    })
}
