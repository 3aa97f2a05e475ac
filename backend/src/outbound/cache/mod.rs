//! Cache store adapters.
//!
//! [`RedisCacheStore`] backs the shared cache in production;
//! [`InMemoryCacheStore`] serves single-process deployments and tests.
//! Prefix invalidation is scan-then-delete in both.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection, RunError};
use bb8_redis::redis::{self, RedisError};
use tracing::debug;

use crate::domain::ports::{CacheStore, CacheStoreError};
use crate::domain::{CacheKey, CachePrefix};

mod memory;

pub use memory::InMemoryCacheStore;

const SCAN_BATCH: usize = 500;
const DELETE_BATCH: usize = 500;

/// Redis-backed cache store using a `bb8` connection pool.
#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisCacheStore {
    /// Connect a pool of at most `max_connections` to `redis_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheStoreError::Backend`] when the URL is invalid or the
    /// initial connection fails.
    pub async fn connect(redis_url: &str, max_connections: u32) -> Result<Self, CacheStoreError> {
        let manager = RedisConnectionManager::new(redis_url).map_err(map_redis_error)?;
        let pool = Pool::builder()
            .max_size(max_connections.max(1))
            .build(manager)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, CacheStoreError> {
        self.pool.get().await.map_err(map_pool_error)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheStoreError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = redis::cmd("GET")
            .arg(key.as_str())
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(value)
    }

    async fn set(
        &self,
        key: &CacheKey,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheStoreError> {
        let mut conn = self.connection().await?;
        let () = redis::cmd("SET")
            .arg(key.as_str())
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool, CacheStoreError> {
        let mut conn = self.connection().await?;
        let removed: usize = redis::cmd("DEL")
            .arg(key.as_str())
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(removed > 0)
    }

    async fn delete_by_prefix(&self, prefix: &CachePrefix) -> Result<usize, CacheStoreError> {
        let mut conn = self.connection().await?;
        let pattern = format!("{}*", escape_glob(prefix.as_str()));

        // SCAN may report a key more than once across iterations.
        let mut matched = BTreeSet::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut *conn)
                .await
                .map_err(map_redis_error)?;
            matched.extend(keys);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        let keys: Vec<String> = matched.into_iter().collect();
        let mut removed = 0;
        for chunk in keys.chunks(DELETE_BATCH) {
            let count: usize = redis::cmd("DEL")
                .arg(chunk)
                .query_async(&mut *conn)
                .await
                .map_err(map_redis_error)?;
            removed += count;
        }
        debug!(prefix = %prefix, matched = keys.len(), removed, "redis prefix deleted");
        Ok(removed)
    }
}

/// Escape Redis glob metacharacters so the prefix matches literally.
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn map_redis_error(error: RedisError) -> CacheStoreError {
    CacheStoreError::backend(error.to_string())
}

fn map_pool_error(error: RunError<RedisError>) -> CacheStoreError {
    match error {
        RunError::User(error) => map_redis_error(error),
        RunError::TimedOut => CacheStoreError::backend("timed out waiting for a redis connection"),
    }
}
