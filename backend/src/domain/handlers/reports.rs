//! Resolves pending reports against a user once an administrator bans them.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::dispatcher::{EventHandler, HandlerError};
use crate::domain::events::UserBanned;
use crate::domain::ports::{AccountRepository, ReportRepository};

/// Marks every pending report against the banned user as accepted by the
/// banning administrator.
///
/// The administrator is re-read so that a dangling reference never resolves
/// reports on behalf of nobody. Already-resolved reports are not returned by
/// the pending query, which makes a second run a no-op.
pub struct ReportClearing {
    accounts: Arc<dyn AccountRepository>,
    reports: Arc<dyn ReportRepository>,
    clock: Arc<dyn Clock>,
}

impl ReportClearing {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        reports: Arc<dyn ReportRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            reports,
            clock,
        }
    }
}

#[async_trait]
impl EventHandler<UserBanned> for ReportClearing {
    fn name(&self) -> &'static str {
        "report_clearing"
    }

    async fn handle(&self, event: &UserBanned) -> Result<(), HandlerError> {
        let Some(admin) = self.accounts.find_admin(&event.admin.id).await? else {
            warn!(
                admin_id = %event.admin.id,
                user_id = %event.user.id,
                "banning admin not found; reports left untouched"
            );
            return Ok(());
        };

        let mut pending = self.reports.find_pending_against(&event.user.id).await?;
        let now = self.clock.utc();
        pending.retain_mut(|report| report.resolve(admin.id, now));
        if pending.is_empty() {
            debug!(user_id = %event.user.id, "no pending reports to resolve");
            return Ok(());
        }

        self.reports.save_all(&pending).await?;
        info!(
            user_id = %event.user.id,
            admin_id = %admin.id,
            count = pending.len(),
            "pending reports resolved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockAccountRepository, MockReportRepository, ReportRepositoryError,
    };
    use crate::domain::{AdminSummary, ReportStatus, UserReport};
    use crate::test_support::MutableClock;
    use crate::test_support::fixtures::{admin, pending_report, user};
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0)
            .single()
            .expect("valid time")
    }

    fn banned_by(admin: &AdminSummary) -> UserBanned {
        UserBanned {
            user: user("banned@example.com"),
            admin: admin.clone(),
            reason: "abuse".to_owned(),
            duration_days: Some(7),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn missing_admin_leaves_reports_untouched(now: DateTime<Utc>) {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_admin().times(1).returning(|_| Ok(None));
        let mut reports = MockReportRepository::new();
        reports.expect_find_pending_against().times(0);
        reports.expect_save_all().times(0);

        let handler = ReportClearing::new(
            Arc::new(accounts),
            Arc::new(reports),
            Arc::new(MutableClock::new(now)),
        );
        handler
            .handle(&banned_by(&admin()))
            .await
            .expect("missing admin is not an error");
    }

    #[rstest]
    #[tokio::test]
    async fn pending_reports_are_attributed_to_the_admin(now: DateTime<Utc>) {
        let acting = admin();
        let event = banned_by(&acting);
        let found = acting.clone();
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_admin()
            .returning(move |_| Ok(Some(found.clone())));
        let target = event.user.id;
        let mut reports = MockReportRepository::new();
        reports
            .expect_find_pending_against()
            .returning(move |_| Ok(vec![pending_report(target), pending_report(target)]));
        let admin_id = acting.id;
        reports
            .expect_save_all()
            .times(1)
            .withf(move |saved: &[UserReport]| {
                saved.len() == 2
                    && saved.iter().all(|report| {
                        report.status == ReportStatus::Accepted
                            && report.reviewed_by == Some(admin_id)
                            && report.reviewed_at == Some(now)
                    })
            })
            .returning(|_| Ok(()));

        let handler = ReportClearing::new(
            Arc::new(accounts),
            Arc::new(reports),
            Arc::new(MutableClock::new(now)),
        );
        handler.handle(&event).await.expect("reports resolved");
    }

    #[rstest]
    #[tokio::test]
    async fn persistence_failure_is_reported(now: DateTime<Utc>) {
        let acting = admin();
        let event = banned_by(&acting);
        let found = acting.clone();
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_admin()
            .returning(move |_| Ok(Some(found.clone())));
        let target = event.user.id;
        let mut reports = MockReportRepository::new();
        reports
            .expect_find_pending_against()
            .returning(move |_| Ok(vec![pending_report(target)]));
        reports
            .expect_save_all()
            .returning(|_| Err(ReportRepositoryError::query("deadlock")));

        let handler = ReportClearing::new(
            Arc::new(accounts),
            Arc::new(reports),
            Arc::new(MutableClock::new(now)),
        );
        let err = handler.handle(&event).await.expect_err("save failure");
        assert!(matches!(err, HandlerError::Reports(_)));
    }
}
