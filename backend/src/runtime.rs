//! Startup and shutdown of the long-lived background tasks.
//!
//! [`BackgroundServices::start`] wires the dispatcher, spawns the
//! notification worker and both reconciliation loops under one
//! cancellation token, and hands the dispatcher to business code.

use std::sync::Arc;

use mockable::Clock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::SideEffectSettings;
use crate::domain::ports::{BanRepository, NotificationTransport, ProposalRepository};
use crate::domain::{
    BanExpirySweep, DeliveryStats, EventDispatcher, NotificationQueue, NotificationWorker,
    ProposalExpirySweep, SideEffectPorts, Sweep, run_periodic, wire_dispatcher,
};

/// Repositories scanned by the reconciliation sweeps.
#[derive(Clone)]
pub struct ReconciliationPorts {
    pub bans: Arc<dyn BanRepository>,
    pub proposals: Arc<dyn ProposalRepository>,
}

/// Handle on the running worker and sweep loops.
pub struct BackgroundServices {
    dispatcher: Arc<EventDispatcher>,
    queue: NotificationQueue,
    shutdown: CancellationToken,
    worker: JoinHandle<DeliveryStats>,
    sweeps: Vec<JoinHandle<()>>,
}

impl BackgroundServices {
    /// Spawn every background task on the current Tokio runtime.
    pub fn start(
        settings: &SideEffectSettings,
        ports: SideEffectPorts,
        reconciliation: ReconciliationPorts,
        transport: Arc<dyn NotificationTransport>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let (queue, receiver) = NotificationQueue::bounded(settings.queue_capacity());
        let dispatcher = Arc::new(wire_dispatcher(&ports, queue.clone()));
        let clock: Arc<dyn Clock> = Arc::clone(&ports.clock);

        let worker = tokio::spawn(NotificationWorker::new(receiver, transport).run(shutdown.clone()));

        let ban_sweep: Arc<dyn Sweep> = Arc::new(BanExpirySweep::new(
            reconciliation.bans,
            Arc::clone(&ports.accounts),
            Arc::clone(&dispatcher),
            Arc::clone(&clock),
        ));
        let proposal_sweep: Arc<dyn Sweep> = Arc::new(ProposalExpirySweep::new(
            reconciliation.proposals,
            Arc::clone(&dispatcher),
            clock,
            settings.proposal_expiry_window(),
        ));
        let sweeps = vec![
            tokio::spawn(run_periodic(
                ban_sweep,
                settings.ban_expiry_interval(),
                shutdown.clone(),
            )),
            tokio::spawn(run_periodic(
                proposal_sweep,
                settings.proposal_expiry_interval(),
                shutdown.clone(),
            )),
        ];

        info!(
            queue_capacity = queue.capacity(),
            "side-effect background services started"
        );
        Self {
            dispatcher,
            queue,
            shutdown,
            worker,
            sweeps,
        }
    }

    /// Dispatcher business code publishes committed events through.
    pub fn dispatcher(&self) -> Arc<EventDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Producer handle on the notification queue.
    pub fn queue(&self) -> NotificationQueue {
        self.queue.clone()
    }

    /// Cancel every loop and wait for them to exit.
    ///
    /// Notifications still queued are dropped.
    pub async fn shutdown(self) -> DeliveryStats {
        self.shutdown.cancel();
        for sweep in self.sweeps {
            if let Err(err) = sweep.await {
                error!(error = %err, "reconciliation loop ended abnormally");
            }
        }
        let stats = match self.worker.await {
            Ok(stats) => stats,
            Err(err) => {
                error!(error = %err, "notification worker ended abnormally");
                DeliveryStats::default()
            }
        };
        info!(
            delivered = stats.delivered,
            failed = stats.failed,
            "side-effect background services stopped"
        );
        stats
    }
}
