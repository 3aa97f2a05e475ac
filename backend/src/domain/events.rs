//! Domain events published after a business transaction commits.
//!
//! Events are immutable snapshots: every handler finds what it needs on the
//! event itself and never has to re-read the record that changed. Publishers
//! emit an event exactly once, after persistence succeeds and never on
//! rollback.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::proposals::PriceProposal;
use super::user::{AdminSummary, UserSummary};

/// An administrator banned a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserBanned {
    pub user: UserSummary,
    pub admin: AdminSummary,
    pub reason: String,
    /// `None` for a permanent ban.
    pub duration_days: Option<u32>,
}

/// An administrator lifted a ban before it expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUnlocked {
    pub user: UserSummary,
    pub admin: AdminSummary,
}

/// A user account was created and awaits email confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRegistered {
    pub user: UserSummary,
    pub confirmation_token: String,
}

/// An administrator accepted or rejected a price proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceProposalEvaluated {
    pub proposal: PriceProposal,
    pub accepted: bool,
}

/// The ban-expiry sweep lifted a ban whose expiry had passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanAutoExpired {
    pub ban_id: Uuid,
    pub user: UserSummary,
    pub expired_at: DateTime<Utc>,
}

/// The proposal-expiry sweep rejected a proposal left pending too long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalAutoExpired {
    pub proposal: PriceProposal,
    pub expired_at: DateTime<Utc>,
}

/// Every event the dispatcher routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    UserBanned(UserBanned),
    UserUnlocked(UserUnlocked),
    UserRegistered(UserRegistered),
    PriceProposalEvaluated(PriceProposalEvaluated),
    BanAutoExpired(BanAutoExpired),
    ProposalAutoExpired(ProposalAutoExpired),
}

macro_rules! impl_from_event {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for DomainEvent {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_event!(
    UserBanned,
    UserUnlocked,
    UserRegistered,
    PriceProposalEvaluated,
    BanAutoExpired,
    ProposalAutoExpired,
);
