//! Ban and user-report records touched by moderation side effects.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::user::{UserId, UserSummary};

/// Persisted ban.
///
/// ## Invariants
/// - At most one active ban exists per user; the business layer enforces this
///   before publishing [`crate::domain::UserBanned`].
/// - Once `active` is false the record is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanRecord {
    pub id: Uuid,
    pub user: UserSummary,
    pub admin_id: UserId,
    pub reason: String,
    pub banned_at: DateTime<Utc>,
    /// `None` for permanent bans, which never expire.
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
    pub lifted_at: Option<DateTime<Utc>>,
}

impl BanRecord {
    /// Whether the ban is active and its expiry is at or before `now`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeDelta, Utc};
    /// use fuelwatch::domain::{BanRecord, Email, UserId, UserSummary};
    /// use uuid::Uuid;
    ///
    /// let now = Utc::now();
    /// let ban = BanRecord {
    ///     id: Uuid::new_v4(),
    ///     user: UserSummary::new(UserId::random(), Email::new("a@b.c").unwrap(), "Ada"),
    ///     admin_id: UserId::random(),
    ///     reason: "spam".to_owned(),
    ///     banned_at: now - TimeDelta::days(2),
    ///     expires_at: Some(now - TimeDelta::seconds(1)),
    ///     active: true,
    ///     lifted_at: None,
    /// };
    /// assert!(ban.is_expired_at(now));
    /// ```
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.is_some_and(|expiry| expiry <= now)
    }

    /// Mark the ban inactive as of `now`.
    pub fn lift(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.lifted_at = Some(now);
    }
}

/// Review state of a report filed against a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Report filed by one user against another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserReport {
    pub id: Uuid,
    pub reported_user_id: UserId,
    pub reporter_id: UserId,
    pub reason: String,
    pub status: ReportStatus,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl UserReport {
    /// Resolve a pending report as accepted on behalf of `admin_id`.
    ///
    /// Reports already out of [`ReportStatus::Pending`] are left untouched and
    /// `false` is returned.
    pub fn resolve(&mut self, admin_id: UserId, now: DateTime<Utc>) -> bool {
        if self.status != ReportStatus::Pending {
            return false;
        }
        self.status = ReportStatus::Accepted;
        self.reviewed_by = Some(admin_id);
        self.reviewed_at = Some(now);
        true
    }
}
