//! LRU TTL Cache - demonstration binary
//!
//! Fills a small cache, touches its keys and prints the resulting recency
//! order.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_ttl_cache::{Cache, CacheConfig};

/// Entry point for the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from positional arguments `[ttl] [min] [max]`,
///    or from environment variables when none are given
/// 3. Put keys 1..=3, read them back in a shuffled order, put key 4
/// 4. Print the cache from most to least recently used
/// 5. Shut the sweeper down
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let params = std::env::args()
        .skip(1)
        .map(|arg| {
            arg.parse::<u64>()
                .with_context(|| format!("parameter {:?} is not a non-negative integer", arg))
        })
        .collect::<anyhow::Result<Vec<u64>>>()?;
    let config = if params.is_empty() {
        CacheConfig::from_env()
    } else {
        CacheConfig::from_params(&params).context("invalid cache configuration")?
    };
    info!(
        "Configuration loaded: ttl={}s, min_bytes={}, max_bytes={}, sweep_interval={}s",
        config.ttl_secs,
        config.min_bytes,
        config.max_bytes,
        config.sweep_interval().as_secs()
    );

    let cache: Cache<u32, String> = Cache::new(config);

    cache.put(1, "str1".to_string()).await;
    cache.put(2, "str2".to_string()).await;
    cache.put(3, "str3".to_string()).await;

    for key in [3, 2, 1, 3] {
        cache.get(&key).await;
    }
    cache.put(4, "str4".to_string()).await;

    cache.display().await;
    info!(
        "{} entries using {} bytes",
        cache.len().await,
        cache.current_bytes().await
    );

    cache.shutdown().await;
    Ok(())
}
