//! Builders for domain records used across tests.

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::domain::{
    AdminSummary, BanRecord, Email, PriceProposal, ProposalStatus, ReportStatus, StationId,
    UserAccount, UserId, UserReport, UserSummary,
};

/// User with a random id; the display name is the email's local part.
pub fn user(email: &str) -> UserSummary {
    let email = Email::new(email).unwrap_or_else(|err| panic!("fixture email {email:?}: {err}"));
    let display_name = email
        .as_ref()
        .split('@')
        .next()
        .unwrap_or_default()
        .to_owned();
    UserSummary::new(UserId::random(), email, display_name)
}

pub fn admin() -> AdminSummary {
    AdminSummary {
        id: UserId::random(),
        display_name: "Moderator".to_owned(),
    }
}

/// Pending proposal created now.
pub fn proposal(author: UserSummary) -> PriceProposal {
    proposal_created_at(author, Utc::now())
}

pub fn proposal_created_at(author: UserSummary, created_at: DateTime<Utc>) -> PriceProposal {
    PriceProposal {
        id: Uuid::new_v4(),
        author,
        station_id: StationId::random(),
        status: ProposalStatus::Pending,
        created_at,
        reviewed_at: None,
    }
}

/// Pending report against `reported` filed by a random user.
pub fn pending_report(reported: UserId) -> UserReport {
    UserReport {
        id: Uuid::new_v4(),
        reported_user_id: reported,
        reporter_id: UserId::random(),
        reason: "fake prices".to_owned(),
        status: ReportStatus::Pending,
        reviewed_by: None,
        reviewed_at: None,
    }
}

/// Active ban on `user`; `expires_at == None` makes it permanent.
pub fn ban(user: UserSummary, expires_at: Option<DateTime<Utc>>) -> BanRecord {
    let banned_at = expires_at.map_or_else(Utc::now, |expiry| expiry - TimeDelta::days(7));
    BanRecord {
        id: Uuid::new_v4(),
        user,
        admin_id: UserId::random(),
        reason: "price spam".to_owned(),
        banned_at,
        expires_at,
        active: true,
        lifted_at: None,
    }
}

/// Account locked until well after `now` with failed sign-ins recorded.
pub fn locked_account(user: UserSummary, now: DateTime<Utc>) -> UserAccount {
    UserAccount {
        user,
        locked_until: Some(now + TimeDelta::days(365)),
        failed_login_attempts: 5,
    }
}
