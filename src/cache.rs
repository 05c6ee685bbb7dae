//! In-memory caching using moka
//!
//! Holds the materialized discount rule set so quotes don't hit the rule
//! source on every request. Rules change rarely (admin edits), so a short TTL
//! plus a periodic warmer is enough to bound staleness.

use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::pricing::models::DiscountRule;
use crate::pricing::services::RuleSource;

/// Cache key for the single rule set.
pub const RULES_KEY: &str = "pricing_rules";

/// Application cache holding pricing rules
#[derive(Clone)]
pub struct AppCache {
    /// Rule sets (RULES_KEY -> rules in evaluation order)
    pub rules: Cache<String, Arc<Vec<DiscountRule>>>,
}

impl AppCache {
    /// Create a new cache instance with the given rule TTL
    pub fn new(rules_ttl: Duration) -> Self {
        Self {
            rules: Cache::builder()
                .max_capacity(1)
                .time_to_live(rules_ttl)
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            rules_cached: self.rules.entry_count() > 0,
        }
    }

    /// Drop the cached rule set
    pub async fn invalidate_rules(&self) {
        self.rules.invalidate(RULES_KEY).await;
        info!("Pricing rules cache invalidated");
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub rules_cached: bool,
}

/// Start background cache warmer
///
/// Loads rules on startup and refreshes them every `every`.
pub async fn start_cache_warmer(cache: AppCache, source: RuleSource, every: Duration) {
    let mut interval = interval(every);
    loop {
        // First tick completes immediately.
        interval.tick().await;
        warm_cache(&cache, &source).await;
    }
}

/// Reload rules from the source into the cache
async fn warm_cache(cache: &AppCache, source: &RuleSource) {
    match source.load().await {
        Ok(rules) => {
            let count = rules.len();
            cache.rules.insert(RULES_KEY.to_string(), Arc::new(rules)).await;
            info!("Pricing rules cache warmed with {} rules", count);
        }
        Err(e) => warn!("Failed to warm pricing rules cache: {}", e),
    }
}
