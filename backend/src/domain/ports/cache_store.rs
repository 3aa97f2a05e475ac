//! Port for the shared key-value cache sitting in front of persistence.
//!
//! The cache is a hint: every entry is derivable from persisted state, so a
//! failed delete degrades performance, never correctness.
use std::time::Duration;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{CacheKey, CachePrefix};

define_port_error! {
    /// Errors surfaced by cache adapters.
    pub enum CacheStoreError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "cache backend failure: {message}",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "cache serialisation failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the raw value stored under `key`.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheStoreError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration)
    -> Result<(), CacheStoreError>;

    /// Remove one key, returning whether it existed.
    async fn delete(&self, key: &CacheKey) -> Result<bool, CacheStoreError>;

    /// Enumerate keys matching `prefix*` and delete them in one batch.
    ///
    /// Enumeration and deletion are not atomic: a key written in between may
    /// survive until the next invalidation. Returns the number removed.
    async fn delete_by_prefix(&self, prefix: &CachePrefix) -> Result<usize, CacheStoreError>;
}
