//! Rejects price proposals left pending past the review window.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use tracing::debug;

use super::{ReconciliationError, Sweep, SweepReport};
use crate::domain::dispatcher::EventDispatcher;
use crate::domain::events::ProposalAutoExpired;
use crate::domain::ports::ProposalRepository;

pub struct ProposalExpirySweep {
    proposals: Arc<dyn ProposalRepository>,
    dispatcher: Arc<EventDispatcher>,
    clock: Arc<dyn Clock>,
    window: TimeDelta,
}

impl ProposalExpirySweep {
    /// Proposals created more than `window` ago and still pending are
    /// rejected on the next sweep.
    pub fn new(
        proposals: Arc<dyn ProposalRepository>,
        dispatcher: Arc<EventDispatcher>,
        clock: Arc<dyn Clock>,
        window: TimeDelta,
    ) -> Self {
        Self {
            proposals,
            dispatcher,
            clock,
            window,
        }
    }
}

#[async_trait]
impl Sweep for ProposalExpirySweep {
    fn name(&self) -> &'static str {
        "proposal_expiry"
    }

    async fn sweep(&self) -> Result<SweepReport, ReconciliationError> {
        let now = self.clock.utc();
        let cutoff = now - self.window;
        let candidates = self.proposals.find_stale_pending(cutoff).await?;
        let mut report = SweepReport {
            scanned: candidates.len(),
            ..SweepReport::default()
        };

        let mut expired = Vec::with_capacity(candidates.len());
        for mut proposal in candidates {
            if !proposal.is_stale(cutoff) {
                report.skipped += 1;
                debug!(proposal_id = %proposal.id, "proposal no longer pending or not yet stale");
                continue;
            }
            proposal.expire(now);
            expired.push(proposal);
        }
        if expired.is_empty() {
            return Ok(report);
        }

        self.proposals.save_all(&expired).await?;
        report.transitioned = expired.len();

        for proposal in expired {
            self.dispatcher
                .dispatch(&ProposalAutoExpired {
                    proposal,
                    expired_at: now,
                })
                .await;
        }
        Ok(report)
    }
}
