//! Redis cache layer for inventory reads
//!
//! Read-through caching with invalidate-on-write. The cache is strictly
//! best-effort: if Redis is unreachable at startup or an operation fails,
//! the layer degrades to always-miss and every read is served from Postgres.
//! Invalidation runs only after the underlying write has committed.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::config::CacheConfig;

/// Namespace prefix for every key this service owns
const KEY_PREFIX: &str = "siteops";

/// Redis-backed cache with automatic JSON serialization
#[derive(Clone)]
pub struct CacheService {
    conn: Option<ConnectionManager>,
    inventory_ttl_secs: u64,
    low_stock_ttl_secs: u64,
}

impl CacheService {
    /// Connect to Redis. On failure the service runs in degraded
    /// (always-miss) mode rather than failing startup.
    pub async fn connect(config: &CacheConfig) -> Self {
        let conn = match redis::Client::open(config.redis_url.as_str()) {
            Ok(client) => match ConnectionManager::new(client).await {
                Ok(manager) => {
                    tracing::info!("Redis cache connected");
                    Some(manager)
                }
                Err(e) => {
                    tracing::warn!("Redis connection failed: {}. Running without cache.", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Invalid Redis URL: {}. Running without cache.", e);
                None
            }
        };

        Self {
            conn,
            inventory_ttl_secs: config.inventory_ttl_secs,
            low_stock_ttl_secs: config.low_stock_ttl_secs,
        }
    }

    /// A cache that never hits, for tests and cache-less deployments
    pub fn disabled() -> Self {
        Self {
            conn: None,
            inventory_ttl_secs: 300,
            low_stock_ttl_secs: 120,
        }
    }

    /// Whether a Redis connection was established (degraded mode otherwise)
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub fn inventory_ttl_secs(&self) -> u64 {
        self.inventory_ttl_secs
    }

    pub fn low_stock_ttl_secs(&self) -> u64 {
        self.low_stock_ttl_secs
    }

    fn namespaced(key: &str) -> String {
        format!("{}:{}", KEY_PREFIX, key)
    }

    /// Get a cached value, deserialized from JSON. Any cache error is a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone()?;
        match conn.get::<_, Option<String>>(Self::namespaced(key)).await {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(value) => {
                    tracing::debug!("Cache hit: {}", key);
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!("Cache payload decode error for {}: {}", key, e);
                    None
                }
            },
            Ok(None) => {
                tracing::debug!("Cache miss: {}", key);
                None
            }
            Err(e) => {
                tracing::warn!("Cache get error for {}: {}", key, e);
                None
            }
        }
    }

    /// Store a value as JSON with an expiry. Failures are logged and ignored.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        let payload = match serde_json::to_string(value) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Cache serialize error for {}: {}", key, e);
                return;
            }
        };
        let result: Result<(), redis::RedisError> = redis::cmd("SETEX")
            .arg(Self::namespaced(key))
            .arg(ttl_secs)
            .arg(payload)
            .query_async(&mut conn)
            .await;
        match result {
            Ok(()) => tracing::debug!("Cache set: {} (expires in {}s)", key, ttl_secs),
            Err(e) => tracing::warn!("Cache set error for {}: {}", key, e),
        }
    }

    /// Delete a single key. Failures are logged and ignored.
    pub async fn delete(&self, key: &str) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        if let Err(e) = conn.del::<_, ()>(Self::namespaced(key)).await {
            tracing::warn!("Cache delete error for {}: {}", key, e);
        } else {
            tracing::debug!("Cache deleted: {}", key);
        }
    }

    /// Delete every key matching a pattern (e.g. `dashboard:*`)
    pub async fn clear_pattern(&self, pattern: &str) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        let keys: Vec<String> = match conn.keys(Self::namespaced(pattern)).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("Cache pattern scan error for {}: {}", pattern, e);
                return;
            }
        };
        if keys.is_empty() {
            return;
        }
        match conn.del::<_, usize>(keys).await {
            Ok(count) => tracing::debug!("Cache cleared {} keys matching: {}", count, pattern),
            Err(e) => tracing::warn!("Cache clear error for {}: {}", pattern, e),
        }
    }

    /// Invalidate everything a stock mutation on a warehouse can make stale.
    /// Call only after the mutation has committed.
    pub async fn invalidate_stock_views(&self, warehouse_ids: &[Uuid]) {
        for warehouse_id in warehouse_ids {
            self.delete(&CacheKeys::inventory_warehouse(*warehouse_id))
                .await;
        }
        self.delete(&CacheKeys::inventory_low_stock()).await;
        self.clear_pattern("dashboard:*").await;
    }
}

/// Centralized cache key generators
pub struct CacheKeys;

impl CacheKeys {
    pub fn inventory_warehouse(warehouse_id: Uuid) -> String {
        format!("inventory:warehouse:{}", warehouse_id)
    }

    pub fn inventory_low_stock() -> String {
        "inventory:low-stock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_scoped_by_warehouse() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        assert_ne!(
            CacheKeys::inventory_warehouse(a),
            CacheKeys::inventory_warehouse(b)
        );
        assert!(CacheKeys::inventory_warehouse(a).starts_with("inventory:warehouse:"));
    }

    #[test]
    fn namespacing_is_applied() {
        assert_eq!(
            CacheService::namespaced("inventory:low-stock"),
            "siteops:inventory:low-stock"
        );
    }

    #[tokio::test]
    async fn disabled_cache_always_misses() {
        let cache = CacheService::disabled();
        cache.set_json("k", &42u32, 60).await;
        assert_eq!(cache.get_json::<u32>("k").await, None);
    }
}
