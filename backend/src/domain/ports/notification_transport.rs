//! Port for the outbound mail relay.
use async_trait::async_trait;

use super::define_port_error;
use crate::domain::OutboundMessage;

define_port_error! {
    /// Errors surfaced by notification transports.
    pub enum NotificationTransportError {
        /// Relay is unreachable or timed out.
        Unavailable { message: String } => "notification relay unavailable: {message}",
        /// Relay answered but refused the message.
        Rejected { message: String } => "notification relay rejected message: {message}",
    }
}

/// Best-effort point-to-point sender. Each call is one delivery attempt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotificationTransportError>;
}
