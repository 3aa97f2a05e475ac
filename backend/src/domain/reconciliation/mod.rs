//! Timer-driven reconciliation of records whose validity window has lapsed.
//!
//! Each [`Sweep`] scans persisted state once; [`run_periodic`] repeats it on
//! a fixed interval until cancelled. Per-item failures are isolated inside a
//! sweep, and whole-sweep failures are logged without stopping the loop.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::ports::{AccountRepositoryError, BanRepositoryError, ProposalRepositoryError};

mod ban_expiry;
mod proposal_expiry;

pub use ban_expiry::BanExpirySweep;
pub use proposal_expiry::ProposalExpirySweep;

/// Counters for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Items returned by the repository scan.
    pub scanned: usize,
    /// Items moved to their terminal state and persisted.
    pub transitioned: usize,
    /// Items that no longer qualified when re-checked.
    pub skipped: usize,
    /// Items whose transition failed.
    pub failed: usize,
}

/// A sweep that could not run at all.
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    #[error(transparent)]
    Bans(#[from] BanRepositoryError),
    #[error(transparent)]
    Proposals(#[from] ProposalRepositoryError),
}

/// Why one scanned item was not transitioned.
#[derive(Debug, thiserror::Error)]
pub enum SweepItemError {
    #[error("record {id} no longer qualifies for expiry")]
    NotEligible { id: Uuid },
    #[error(transparent)]
    Accounts(#[from] AccountRepositoryError),
}

#[async_trait]
pub trait Sweep: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    async fn sweep(&self) -> Result<SweepReport, ReconciliationError>;
}

/// Run `sweep` every `period` until `shutdown` fires.
///
/// The first sweep happens one full period after start. A sweep that
/// overruns delays the next tick instead of bursting to catch up.
pub async fn run_periodic(sweep: Arc<dyn Sweep>, period: Duration, shutdown: CancellationToken) {
    let name = sweep.name();
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(sweep = name, period_secs = period.as_secs(), "reconciliation loop started");

    loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match AssertUnwindSafe(sweep.sweep()).catch_unwind().await {
            Ok(Ok(report)) if report == SweepReport::default() => {
                debug!(sweep = name, "nothing to reconcile");
            }
            Ok(Ok(report)) => info!(
                sweep = name,
                scanned = report.scanned,
                transitioned = report.transitioned,
                skipped = report.skipped,
                failed = report.failed,
                "sweep completed"
            ),
            Ok(Err(err)) => error!(sweep = name, error = %err, "sweep failed; retrying next tick"),
            Err(_) => error!(sweep = name, "sweep panicked; retrying next tick"),
        }
    }

    info!(sweep = name, "reconciliation loop stopped");
}
