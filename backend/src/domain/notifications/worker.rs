//! Long-lived consumer delivering queued notifications.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{NotificationReceiver, OutboundMessage};
use crate::domain::ports::NotificationTransport;

/// Counters reported when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub failed: u64,
}

/// Single consumer of the notification queue.
///
/// Delivery is at-most-once: a failed attempt is logged and the message is
/// dropped. Messages still queued when the worker is cancelled are lost.
pub struct NotificationWorker {
    receiver: NotificationReceiver,
    transport: Arc<dyn NotificationTransport>,
}

impl NotificationWorker {
    pub fn new(receiver: NotificationReceiver, transport: Arc<dyn NotificationTransport>) -> Self {
        Self {
            receiver,
            transport,
        }
    }

    /// Deliver messages until `shutdown` fires or every producer is dropped.
    ///
    /// Cancellation is checked between messages; an in-flight send always
    /// completes first.
    pub async fn run(mut self, shutdown: CancellationToken) -> DeliveryStats {
        let mut stats = DeliveryStats::default();
        loop {
            let message = tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                next = self.receiver.dequeue() => match next {
                    Some(message) => message,
                    None => {
                        debug!("notification producers dropped; worker exiting");
                        break;
                    }
                },
            };
            self.deliver(&message, &mut stats).await;
        }
        info!(
            delivered = stats.delivered,
            failed = stats.failed,
            "notification worker stopped"
        );
        stats
    }

    async fn deliver(&self, message: &OutboundMessage, stats: &mut DeliveryStats) {
        let attempt = AssertUnwindSafe(self.transport.send(message))
            .catch_unwind()
            .await;
        match attempt {
            Ok(Ok(())) => {
                stats.delivered += 1;
                debug!(recipient = %message.recipient, "notification delivered");
            }
            Ok(Err(error)) => {
                stats.failed += 1;
                warn!(
                    recipient = %message.recipient,
                    subject = %message.subject,
                    %error,
                    "notification delivery failed; message dropped"
                );
            }
            Err(_) => {
                stats.failed += 1;
                warn!(
                    recipient = %message.recipient,
                    "notification transport panicked; message dropped"
                );
            }
        }
    }
}
