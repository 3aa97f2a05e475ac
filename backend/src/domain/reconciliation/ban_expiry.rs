//! Lifts bans whose expiry has passed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, warn};

use super::{ReconciliationError, Sweep, SweepItemError, SweepReport};
use crate::domain::dispatcher::EventDispatcher;
use crate::domain::events::BanAutoExpired;
use crate::domain::ports::{AccountRepository, BanExpiry, BanRepository};
use crate::domain::BanRecord;

/// Deactivates expired bans and clears the owners' lockout.
///
/// Transitions are persisted in one batch at the end of the sweep; a
/// [`BanAutoExpired`] event is published per lifted ban only after that
/// batch succeeds. A ban whose account has been deleted is still lifted, but
/// publishes nothing.
pub struct BanExpirySweep {
    bans: Arc<dyn BanRepository>,
    accounts: Arc<dyn AccountRepository>,
    dispatcher: Arc<EventDispatcher>,
    clock: Arc<dyn Clock>,
}

impl BanExpirySweep {
    pub fn new(
        bans: Arc<dyn BanRepository>,
        accounts: Arc<dyn AccountRepository>,
        dispatcher: Arc<EventDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bans,
            accounts,
            dispatcher,
            clock,
        }
    }

    async fn expire(&self, mut ban: BanRecord, now: DateTime<Utc>) -> Result<BanExpiry, SweepItemError> {
        if !ban.is_expired_at(now) {
            return Err(SweepItemError::NotEligible { id: ban.id });
        }
        let mut account = self.accounts.find_account(&ban.user.id).await?;
        ban.lift(now);
        match account.as_mut() {
            Some(account) => account.unlock(),
            None => debug!(
                ban_id = %ban.id,
                user_id = %ban.user.id,
                "banned account no longer exists; lifting ban only"
            ),
        }
        Ok(BanExpiry { ban, account })
    }
}

#[async_trait]
impl Sweep for BanExpirySweep {
    fn name(&self) -> &'static str {
        "ban_expiry"
    }

    async fn sweep(&self) -> Result<SweepReport, ReconciliationError> {
        let now = self.clock.utc();
        let candidates = self.bans.find_expired_active(now).await?;
        let mut report = SweepReport {
            scanned: candidates.len(),
            ..SweepReport::default()
        };

        let mut expiries = Vec::with_capacity(candidates.len());
        for ban in candidates {
            let ban_id = ban.id;
            match self.expire(ban, now).await {
                Ok(expiry) => expiries.push(expiry),
                Err(SweepItemError::NotEligible { id }) => {
                    report.skipped += 1;
                    debug!(ban_id = %id, "ban no longer eligible for expiry");
                }
                Err(err) => {
                    report.failed += 1;
                    warn!(%ban_id, error = %err, "ban expiry failed; will retry next sweep");
                }
            }
        }
        if expiries.is_empty() {
            return Ok(report);
        }

        self.bans.save_expired(&expiries).await?;
        report.transitioned = expiries.len();

        for expiry in expiries.into_iter().filter(|expiry| expiry.account.is_some()) {
            let event = BanAutoExpired {
                ban_id: expiry.ban.id,
                user: expiry.ban.user,
                expired_at: now,
            };
            self.dispatcher.dispatch(&event).await;
        }
        Ok(report)
    }
}
