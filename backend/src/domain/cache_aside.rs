//! Cache-aside reads for services in front of persistence.
//!
//! Values are stored as JSON under a [`CacheKey`] with a jittered TTL so that
//! entries written together do not all expire together. The cache is a hint:
//! read failures, undecodable entries, and write failures all fall back to
//! the loader and are only logged.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::CacheKey;
use super::ports::CacheStore;

pub struct CacheAside {
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
    jitter: Duration,
    rng: Mutex<SmallRng>,
}

impl CacheAside {
    /// Entries live for `ttl` plus a random extra of at most `jitter`.
    pub fn new(cache: Arc<dyn CacheStore>, ttl: Duration, jitter: Duration) -> Self {
        Self::with_rng(cache, ttl, jitter, SmallRng::from_entropy())
    }

    /// Like [`CacheAside::new`] with a reproducible jitter sequence.
    pub fn seeded(cache: Arc<dyn CacheStore>, ttl: Duration, jitter: Duration, seed: u64) -> Self {
        Self::with_rng(cache, ttl, jitter, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(cache: Arc<dyn CacheStore>, ttl: Duration, jitter: Duration, rng: SmallRng) -> Self {
        Self {
            cache,
            ttl,
            jitter,
            rng: Mutex::new(rng),
        }
    }

    /// Return the cached value under `key`, or load, cache, and return it.
    ///
    /// # Errors
    ///
    /// Only errors from `load` are returned.
    pub async fn get_or_load<T, E, F, Fut>(&self, key: &CacheKey, load: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(%key, "cache hit");
                    return Ok(value);
                }
                Err(error) => warn!(%key, %error, "undecodable cache entry; reloading"),
            },
            Ok(None) => debug!(%key, "cache miss"),
            Err(error) => warn!(%key, %error, "cache read failed; loading from source"),
        }

        let value = load().await?;
        self.store(key, &value).await;
        Ok(value)
    }

    async fn store<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%key, %error, "value not cacheable");
                return;
            }
        };
        let ttl = self.jittered_ttl();
        if let Err(error) = self.cache.set(key, &raw, ttl).await {
            warn!(%key, %error, "cache write failed");
        }
    }

    fn jittered_ttl(&self) -> Duration {
        let max_extra = u64::try_from(self.jitter.as_millis()).unwrap_or(u64::MAX);
        if max_extra == 0 {
            return self.ttl;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.ttl
            .saturating_add(Duration::from_millis(rng.gen_range(0..=max_extra)))
    }
}
