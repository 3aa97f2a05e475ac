//! Port turning a recipient and event details into a subject and body.
//!
//! Rendering is a pure function; the concrete wording lives outside this core.
use crate::domain::UserSummary;

/// Event details a template needs, borrowed from the event being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice<'a> {
    Banned {
        reason: &'a str,
        duration_days: Option<u32>,
    },
    Unlocked,
    AutoUnlocked,
    Registered {
        confirmation_token: &'a str,
    },
    ProposalEvaluated {
        station: &'a str,
        accepted: bool,
    },
    ProposalAutoRejected {
        station: &'a str,
    },
}

/// Rendered subject and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNotification {
    pub subject: String,
    pub body: String,
}

pub trait NotificationTemplates: Send + Sync {
    fn render(&self, recipient: &UserSummary, notice: Notice<'_>) -> RenderedNotification;
}

/// Plain-text templates used when no richer renderer is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextTemplates;

impl NotificationTemplates for PlainTextTemplates {
    fn render(&self, recipient: &UserSummary, notice: Notice<'_>) -> RenderedNotification {
        let name = recipient.display_name.as_str();
        let (subject, body) = match notice {
            Notice::Banned {
                reason,
                duration_days: Some(days),
            } => (
                "Your account has been suspended".to_owned(),
                format!("Hello {name}, your account is suspended for {days} days. Reason: {reason}"),
            ),
            Notice::Banned {
                reason,
                duration_days: None,
            } => (
                "Your account has been suspended".to_owned(),
                format!("Hello {name}, your account is suspended permanently. Reason: {reason}"),
            ),
            Notice::Unlocked => (
                "Your account has been restored".to_owned(),
                format!("Hello {name}, an administrator has lifted your suspension."),
            ),
            Notice::AutoUnlocked => (
                "Your suspension has ended".to_owned(),
                format!("Hello {name}, your suspension has expired and you can sign in again."),
            ),
            Notice::Registered { confirmation_token } => (
                "Confirm your email address".to_owned(),
                format!("Hello {name}, confirm your account with this code: {confirmation_token}"),
            ),
            Notice::ProposalEvaluated {
                station,
                accepted: true,
            } => (
                "Your price proposal was accepted".to_owned(),
                format!("Hello {name}, your price for station {station} is now live."),
            ),
            Notice::ProposalEvaluated {
                station,
                accepted: false,
            } => (
                "Your price proposal was rejected".to_owned(),
                format!("Hello {name}, your price for station {station} was not accepted."),
            ),
            Notice::ProposalAutoRejected { station } => (
                "Your price proposal has expired".to_owned(),
                format!(
                    "Hello {name}, your price for station {station} was not reviewed in time and has been withdrawn."
                ),
            ),
        };
        RenderedNotification { subject, body }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Email, UserId};
    use rstest::rstest;

    fn recipient() -> UserSummary {
        UserSummary::new(
            UserId::random(),
            Email::new("ada@example.com").expect("valid email"),
            "Ada",
        )
    }

    #[rstest]
    #[case(Notice::Banned { reason: "spam", duration_days: Some(7) }, "7 days")]
    #[case(Notice::Banned { reason: "spam", duration_days: None }, "permanently")]
    #[case(Notice::Registered { confirmation_token: "tok-123" }, "tok-123")]
    #[case(Notice::ProposalEvaluated { station: "st-1", accepted: true }, "now live")]
    #[case(Notice::AutoUnlocked, "expired")]
    #[case(Notice::ProposalAutoRejected { station: "st-9" }, "st-9")]
    fn plain_text_bodies_mention_event_details(#[case] notice: Notice<'_>, #[case] needle: &str) {
        let rendered = PlainTextTemplates.render(&recipient(), notice);
        assert!(rendered.body.starts_with("Hello Ada"));
        assert!(
            rendered.body.contains(needle),
            "body {:?} should contain {needle:?}",
            rendered.body
        );
        assert!(!rendered.subject.is_empty());
    }
}
