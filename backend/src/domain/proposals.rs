//! Price proposals and per-author proposal statistics.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{UserId, UserSummary};

/// Fuel station identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(Uuid);

impl StationId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for StationId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Review state of a price proposal. Everything but `Pending` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Community-submitted fuel price awaiting or past review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceProposal {
    pub id: Uuid,
    pub author: UserSummary,
    pub station_id: StationId,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl PriceProposal {
    /// Whether the proposal is still pending and was created before `cutoff`.
    pub fn is_stale(&self, cutoff: DateTime<Utc>) -> bool {
        self.status == ProposalStatus::Pending && self.created_at < cutoff
    }

    /// Reject a pending proposal as of `now`.
    pub fn expire(&mut self, now: DateTime<Utc>) {
        self.status = ProposalStatus::Rejected;
        self.reviewed_at = Some(now);
    }
}

/// Running tally of an author's proposal outcomes.
///
/// ## Invariants
/// - `total_proposals == approved_proposals + rejected_proposals` for records
///   maintained solely through [`ProposalStatistics::record_verdict`].
/// - `acceptance_rate` is a percentage in `0.0..=100.0`, rounded to two
///   decimal places, and `0.0` when no proposal has been evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalStatistics {
    pub user_id: UserId,
    pub total_proposals: u32,
    pub approved_proposals: u32,
    pub rejected_proposals: u32,
    pub acceptance_rate: f64,
}

impl ProposalStatistics {
    /// Zeroed record created when a user registers.
    pub fn zeroed(user_id: UserId) -> Self {
        Self {
            user_id,
            total_proposals: 0,
            approved_proposals: 0,
            rejected_proposals: 0,
            acceptance_rate: 0.0,
        }
    }

    /// Count one evaluated proposal and recompute the acceptance rate.
    ///
    /// # Examples
    /// ```
    /// use fuelwatch::domain::{ProposalStatistics, UserId};
    ///
    /// let mut stats = ProposalStatistics::zeroed(UserId::random());
    /// stats.record_verdict(true);
    /// stats.record_verdict(false);
    /// assert_eq!(stats.total_proposals, 2);
    /// assert_eq!(stats.acceptance_rate, 50.0);
    /// ```
    pub fn record_verdict(&mut self, accepted: bool) {
        self.total_proposals = self.total_proposals.saturating_add(1);
        if accepted {
            self.approved_proposals = self.approved_proposals.saturating_add(1);
        } else {
            self.rejected_proposals = self.rejected_proposals.saturating_add(1);
        }
        self.acceptance_rate = acceptance_rate(self.approved_proposals, self.total_proposals);
    }
}

fn acceptance_rate(approved: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ratio = f64::from(approved) * 100.0 / f64::from(total);
    (ratio * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(true, 1, 0, 100.0)]
    #[case(false, 0, 1, 0.0)]
    fn single_verdict_on_fresh_record(
        #[case] accepted: bool,
        #[case] approved: u32,
        #[case] rejected: u32,
        #[case] rate: f64,
    ) {
        let mut stats = ProposalStatistics::zeroed(UserId::random());
        stats.record_verdict(accepted);

        assert_eq!(stats.total_proposals, 1);
        assert_eq!(stats.approved_proposals, approved);
        assert_eq!(stats.rejected_proposals, rejected);
        assert_eq!(stats.acceptance_rate, rate);
    }

    #[rstest]
    #[case(0, 0, 0.0)]
    #[case(1, 3, 33.33)]
    #[case(2, 3, 66.67)]
    #[case(3, 3, 100.0)]
    fn acceptance_rate_is_rounded_percentage(
        #[case] approved: u32,
        #[case] total: u32,
        #[case] expected: f64,
    ) {
        assert_eq!(acceptance_rate(approved, total), expected);
    }
}
