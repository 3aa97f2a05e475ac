//! Cache invalidation reacting to moderation and proposal verdicts.
//!
//! Every key touched here is a cache-aside hint, so deletions are idempotent
//! and a failed deletion only leaves a stale entry behind until its TTL runs
//! out. All deletions of one event are attempted even if an earlier one
//! fails; the first failure is reported to the dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::dispatcher::{EventHandler, HandlerError};
use crate::domain::events::{
    BanAutoExpired, PriceProposalEvaluated, ProposalAutoExpired, UserBanned, UserUnlocked,
};
use crate::domain::ports::{CacheStore, CacheStoreError};
use crate::domain::{CacheKey, CachePrefix, Email};

/// Collects deletions for one event, remembering the first failure.
struct Invalidation<'a> {
    cache: &'a dyn CacheStore,
    first_error: Option<CacheStoreError>,
}

impl<'a> Invalidation<'a> {
    fn new(cache: &'a dyn CacheStore) -> Self {
        Self {
            cache,
            first_error: None,
        }
    }

    async fn key(&mut self, key: CacheKey) {
        match self.cache.delete(&key).await {
            Ok(existed) => debug!(key = %key, existed, "cache key invalidated"),
            Err(err) => self.record(err),
        }
    }

    async fn prefix(&mut self, prefix: CachePrefix) {
        match self.cache.delete_by_prefix(&prefix).await {
            Ok(count) => debug!(prefix = %prefix, count, "cache prefix invalidated"),
            Err(err) => self.record(err),
        }
    }

    fn record(&mut self, err: CacheStoreError) {
        if self.first_error.is_none() {
            self.first_error = Some(err);
        }
    }

    fn finish(self) -> Result<(), HandlerError> {
        self.first_error.map_or(Ok(()), |err| Err(err.into()))
    }
}

/// Drops list views and per-user entries whenever a user's ban status changes.
pub struct UserCacheInvalidation {
    cache: Arc<dyn CacheStore>,
}

impl UserCacheInvalidation {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    async fn invalidate(&self, email: &Email) -> Result<(), HandlerError> {
        let mut batch = Invalidation::new(self.cache.as_ref());
        batch.prefix(CachePrefix::users_list()).await;
        batch.key(CacheKey::user_info(email)).await;
        batch.key(CacheKey::user_stats(email)).await;
        batch.finish()
    }
}

#[async_trait]
impl EventHandler<UserBanned> for UserCacheInvalidation {
    fn name(&self) -> &'static str {
        "user_cache_invalidation"
    }

    async fn handle(&self, event: &UserBanned) -> Result<(), HandlerError> {
        self.invalidate(&event.user.email).await
    }
}

#[async_trait]
impl EventHandler<UserUnlocked> for UserCacheInvalidation {
    fn name(&self) -> &'static str {
        "user_cache_invalidation"
    }

    async fn handle(&self, event: &UserUnlocked) -> Result<(), HandlerError> {
        self.invalidate(&event.user.email).await
    }
}

#[async_trait]
impl EventHandler<BanAutoExpired> for UserCacheInvalidation {
    fn name(&self) -> &'static str {
        "user_cache_invalidation"
    }

    async fn handle(&self, event: &BanAutoExpired) -> Result<(), HandlerError> {
        self.invalidate(&event.user.email).await
    }
}

/// Drops entries derived from a proposal's outcome.
///
/// A rejection changes neither the displayed station price nor the
/// contributor ranking, so only the author's statistics are dropped then.
pub struct ProposalCacheInvalidation {
    cache: Arc<dyn CacheStore>,
}

impl ProposalCacheInvalidation {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl EventHandler<PriceProposalEvaluated> for ProposalCacheInvalidation {
    fn name(&self) -> &'static str {
        "proposal_cache_invalidation"
    }

    async fn handle(&self, event: &PriceProposalEvaluated) -> Result<(), HandlerError> {
        let mut batch = Invalidation::new(self.cache.as_ref());
        batch
            .key(CacheKey::user_stats(&event.proposal.author.email))
            .await;
        if event.accepted {
            batch.prefix(CachePrefix::top_users()).await;
            batch
                .prefix(CachePrefix::station(&event.proposal.station_id))
                .await;
        }
        batch.finish()
    }
}

#[async_trait]
impl EventHandler<ProposalAutoExpired> for ProposalCacheInvalidation {
    fn name(&self) -> &'static str {
        "proposal_cache_invalidation"
    }

    async fn handle(&self, event: &ProposalAutoExpired) -> Result<(), HandlerError> {
        let mut batch = Invalidation::new(self.cache.as_ref());
        batch
            .key(CacheKey::user_stats(&event.proposal.author.email))
            .await;
        batch.finish()
    }
}
