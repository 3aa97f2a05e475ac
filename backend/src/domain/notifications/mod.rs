//! Bounded outbound notification queue.
//!
//! Handlers decide *that* a notification goes out and enqueue it; the
//! [`NotificationWorker`] owns *sending* it. The queue is bounded, so a slow
//! relay throttles producers instead of dropping messages or growing without
//! limit.

use tokio::sync::mpsc;

use super::user::Email;

mod worker;

pub use worker::{DeliveryStats, NotificationWorker};

/// Opaque message payload; the queue never interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: Email,
    pub subject: String,
    pub body: String,
}

/// Errors returned by [`NotificationQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotificationQueueError {
    /// The worker side has shut down; nothing will ever drain the queue.
    #[error("notification queue is closed")]
    Closed,
}

/// Producer handle. Cheap to clone; every clone feeds the same worker.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    sender: mpsc::Sender<OutboundMessage>,
}

/// Consumer half, owned by exactly one [`NotificationWorker`].
#[derive(Debug)]
pub struct NotificationReceiver {
    receiver: mpsc::Receiver<OutboundMessage>,
}

impl NotificationQueue {
    /// Create a queue holding at most `capacity` undelivered messages.
    ///
    /// A capacity of zero is raised to one.
    ///
    /// # Examples
    /// ```
    /// use fuelwatch::domain::NotificationQueue;
    ///
    /// let (queue, _receiver) = NotificationQueue::bounded(0);
    /// assert_eq!(queue.capacity(), 1);
    /// ```
    pub fn bounded(capacity: usize) -> (Self, NotificationReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, NotificationReceiver { receiver })
    }

    /// Add a message, suspending while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationQueueError::Closed`] once the receiver is gone.
    pub async fn enqueue(&self, message: OutboundMessage) -> Result<(), NotificationQueueError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| NotificationQueueError::Closed)
    }

    /// Maximum number of queued messages.
    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Free slots right now.
    pub fn available(&self) -> usize {
        self.sender.capacity()
    }
}

impl NotificationReceiver {
    /// Pop the next message, suspending while the queue is empty.
    ///
    /// Returns `None` once every producer handle has been dropped and the
    /// queue is drained.
    pub async fn dequeue(&mut self) -> Option<OutboundMessage> {
        self.receiver.recv().await
    }

    /// Pop the next message if one is queued right now.
    pub fn try_dequeue(&mut self) -> Option<OutboundMessage> {
        self.receiver.try_recv().ok()
    }
}
