//! Reqwest-backed mail relay transport.
//!
//! Messages are posted as JSON to a relay endpoint. Every call is a single
//! attempt; retries belong to the relay.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use tracing::info;

use crate::domain::OutboundMessage;
use crate::domain::ports::{NotificationTransport, NotificationTransportError};

const USER_AGENT: &str = "fuelwatch-notifier/0.1";

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Notification transport posting to an HTTP mail relay.
pub struct HttpMailRelay {
    client: Client,
    endpoint: Url,
    sender: String,
}

impl HttpMailRelay {
    /// Build a relay client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        sender: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            sender: sender.into(),
        })
    }
}

#[async_trait]
impl NotificationTransport for HttpMailRelay {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotificationTransportError> {
        let payload = RelayPayload {
            from: &self.sender,
            to: message.recipient.as_ref(),
            subject: &message.subject,
            text: &message.body,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &body))
    }
}

/// Transport used when no relay is configured: each message is logged and
/// reported as delivered.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyTransport;

#[async_trait]
impl NotificationTransport for LogOnlyTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), NotificationTransportError> {
        info!(
            recipient = %message.recipient,
            subject = %message.subject,
            "mail relay not configured; notification logged only"
        );
        Ok(())
    }
}

fn map_transport_error(error: reqwest::Error) -> NotificationTransportError {
    NotificationTransportError::unavailable(error.to_string())
}

fn map_status_error(status: StatusCode, body: &str) -> NotificationTransportError {
    const PREVIEW_CHAR_LIMIT: usize = 120;

    let preview: String = body
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect();
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT => {
            NotificationTransportError::unavailable(message)
        }
        _ if status.is_client_error() => NotificationTransportError::rejected(message),
        _ => NotificationTransportError::unavailable(message),
    }
}

#[cfg(test)]
mod tests {
    //! Status mapping and payload shape.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StatusCode::BAD_REQUEST, true)]
    #[case(StatusCode::UNPROCESSABLE_ENTITY, true)]
    #[case(StatusCode::TOO_MANY_REQUESTS, false)]
    #[case(StatusCode::BAD_GATEWAY, false)]
    fn client_errors_are_rejections(#[case] status: StatusCode, #[case] rejected: bool) {
        let error = map_status_error(status, "  mailbox \n unavailable ");
        assert_eq!(
            matches!(error, NotificationTransportError::Rejected { .. }),
            rejected
        );
        assert!(error.to_string().contains("mailbox unavailable"));
    }

    #[rstest]
    #[tokio::test]
    async fn log_only_transport_accepts_every_message() {
        let message = OutboundMessage {
            recipient: crate::domain::Email::new("driver@example.com").expect("valid email"),
            subject: "Hi".to_owned(),
            body: "Body".to_owned(),
        };
        LogOnlyTransport
            .send(&message)
            .await
            .expect("logged messages count as sent");
    }

    #[rstest]
    fn payload_uses_relay_field_names() {
        let payload = RelayPayload {
            from: "no-reply@fuelwatch.invalid",
            to: "driver@example.com",
            subject: "Hi",
            text: "Body",
        };
        let json = serde_json::to_value(&payload).expect("serialise");
        assert_eq!(json["from"], "no-reply@fuelwatch.invalid");
        assert_eq!(json["to"], "driver@example.com");
        assert_eq!(json["text"], "Body");
    }
}
