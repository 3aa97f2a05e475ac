//! Process-local cache store with per-entry expiry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::domain::ports::{CacheStore, CacheStoreError};
use crate::domain::{CacheKey, CachePrefix};

struct Entry {
    value: String,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-memory [`CacheStore`]. Expired entries are dropped lazily on access.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheStoreError> {
        let mut entries = self.lock();
        match entries.get(key.as_str()) {
            Some(entry) if entry.is_live(Instant::now()) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key.as_str());
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &CacheKey,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheStoreError> {
        let entry = Entry {
            value: value.to_owned(),
            expires_at: Instant::now().checked_add(ttl),
        };
        self.lock().insert(key.as_str().to_owned(), entry);
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool, CacheStoreError> {
        let now = Instant::now();
        Ok(self
            .lock()
            .remove(key.as_str())
            .is_some_and(|entry| entry.is_live(now)))
    }

    async fn delete_by_prefix(&self, prefix: &CachePrefix) -> Result<usize, CacheStoreError> {
        let now = Instant::now();
        let mut entries = self.lock();
        let matched: Vec<String> = entries
            .keys()
            .filter(|key| key.starts_with(prefix.as_str()))
            .cloned()
            .collect();
        let removed = matched
            .iter()
            .filter_map(|key| entries.remove(key))
            .filter(|entry| entry.is_live(now))
            .count();
        Ok(removed)
    }
}
