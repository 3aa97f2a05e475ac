//! Outbound notifications for moderation, registration, and proposal events.
//!
//! The handler renders a message and enqueues it; delivery belongs to the
//! notification worker. A rejected enqueue is logged and not retried here.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::dispatcher::{EventHandler, HandlerError};
use crate::domain::events::{
    BanAutoExpired, PriceProposalEvaluated, ProposalAutoExpired, UserBanned, UserRegistered,
    UserUnlocked,
};
use crate::domain::ports::{Notice, NotificationTemplates};
use crate::domain::{NotificationQueue, OutboundMessage, UserSummary};

pub struct NotificationHandler {
    templates: Arc<dyn NotificationTemplates>,
    queue: NotificationQueue,
}

impl NotificationHandler {
    pub fn new(templates: Arc<dyn NotificationTemplates>, queue: NotificationQueue) -> Self {
        Self { templates, queue }
    }

    async fn notify(&self, event: &'static str, recipient: &UserSummary, notice: Notice<'_>) {
        let rendered = self.templates.render(recipient, notice);
        let message = OutboundMessage {
            recipient: recipient.email.clone(),
            subject: rendered.subject,
            body: rendered.body,
        };
        match self.queue.enqueue(message).await {
            Ok(()) => debug!(event, recipient = %recipient.email, "notification queued"),
            Err(err) => warn!(
                event,
                recipient = %recipient.email,
                error = %err,
                "notification not queued"
            ),
        }
    }
}

#[async_trait]
impl EventHandler<UserBanned> for NotificationHandler {
    fn name(&self) -> &'static str {
        "ban_notification"
    }

    async fn handle(&self, event: &UserBanned) -> Result<(), HandlerError> {
        let notice = Notice::Banned {
            reason: &event.reason,
            duration_days: event.duration_days,
        };
        self.notify("user_banned", &event.user, notice).await;
        Ok(())
    }
}

#[async_trait]
impl EventHandler<UserUnlocked> for NotificationHandler {
    fn name(&self) -> &'static str {
        "unlock_notification"
    }

    async fn handle(&self, event: &UserUnlocked) -> Result<(), HandlerError> {
        self.notify("user_unlocked", &event.user, Notice::Unlocked)
            .await;
        Ok(())
    }
}

#[async_trait]
impl EventHandler<BanAutoExpired> for NotificationHandler {
    fn name(&self) -> &'static str {
        "auto_unlock_notification"
    }

    async fn handle(&self, event: &BanAutoExpired) -> Result<(), HandlerError> {
        self.notify("ban_auto_expired", &event.user, Notice::AutoUnlocked)
            .await;
        Ok(())
    }
}

#[async_trait]
impl EventHandler<UserRegistered> for NotificationHandler {
    fn name(&self) -> &'static str {
        "registration_notification"
    }

    async fn handle(&self, event: &UserRegistered) -> Result<(), HandlerError> {
        let notice = Notice::Registered {
            confirmation_token: &event.confirmation_token,
        };
        self.notify("user_registered", &event.user, notice).await;
        Ok(())
    }
}

#[async_trait]
impl EventHandler<PriceProposalEvaluated> for NotificationHandler {
    fn name(&self) -> &'static str {
        "proposal_verdict_notification"
    }

    async fn handle(&self, event: &PriceProposalEvaluated) -> Result<(), HandlerError> {
        let station = event.proposal.station_id.to_string();
        let notice = Notice::ProposalEvaluated {
            station: &station,
            accepted: event.accepted,
        };
        self.notify("price_proposal_evaluated", &event.proposal.author, notice)
            .await;
        Ok(())
    }
}

#[async_trait]
impl EventHandler<ProposalAutoExpired> for NotificationHandler {
    fn name(&self) -> &'static str {
        "proposal_expiry_notification"
    }

    async fn handle(&self, event: &ProposalAutoExpired) -> Result<(), HandlerError> {
        let station = event.proposal.station_id.to_string();
        let notice = Notice::ProposalAutoRejected { station: &station };
        self.notify("proposal_auto_expired", &event.proposal.author, notice)
            .await;
        Ok(())
    }
}
