//! Notification transport that records every delivered message.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::OutboundMessage;
use crate::domain::ports::{NotificationTransport, NotificationTransportError};

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.lock().clone()
    }

    /// Poll until at least `count` messages arrived or `deadline` passes.
    pub async fn wait_for(&self, count: usize, deadline: Duration) -> Vec<OutboundMessage> {
        let poll = async {
            loop {
                if self.lock().len() >= count {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        let _ = tokio::time::timeout(deadline, poll).await;
        self.sent()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<OutboundMessage>> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotificationTransportError> {
        self.lock().push(message.clone());
        Ok(())
    }
}
