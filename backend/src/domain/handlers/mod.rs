//! Side-effect handlers and the static routing table that wires them.
//!
//! | Event                    | Handlers (in order)                                  |
//! |--------------------------|------------------------------------------------------|
//! | `UserBanned`             | user cache, notification, report clearing            |
//! | `UserUnlocked`           | user cache, notification                             |
//! | `UserRegistered`         | statistics initialisation, notification              |
//! | `PriceProposalEvaluated` | proposal cache, statistics update, notification      |
//! | `BanAutoExpired`         | user cache, notification                             |
//! | `ProposalAutoExpired`    | proposal cache, notification                         |

use std::sync::Arc;

use mockable::Clock;

use super::NotificationQueue;
use super::dispatcher::EventDispatcher;
use super::events::{
    BanAutoExpired, PriceProposalEvaluated, ProposalAutoExpired, UserBanned, UserRegistered,
    UserUnlocked,
};
use super::ports::{
    AccountRepository, CacheStore, NotificationTemplates, ReportRepository, StatisticsRepository,
};

mod cache_invalidation;
mod notification;
mod reports;
mod statistics;

pub use cache_invalidation::{ProposalCacheInvalidation, UserCacheInvalidation};
pub use notification::NotificationHandler;
pub use reports::ReportClearing;
pub use statistics::{StatisticsInitialization, StatisticsUpdate};

/// Collaborators shared by the handler family.
#[derive(Clone)]
pub struct SideEffectPorts {
    pub cache: Arc<dyn CacheStore>,
    pub accounts: Arc<dyn AccountRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub statistics: Arc<dyn StatisticsRepository>,
    pub templates: Arc<dyn NotificationTemplates>,
    pub clock: Arc<dyn Clock>,
}

impl SideEffectPorts {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        accounts: Arc<dyn AccountRepository>,
        reports: Arc<dyn ReportRepository>,
        statistics: Arc<dyn StatisticsRepository>,
        templates: Arc<dyn NotificationTemplates>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cache,
            accounts,
            reports,
            statistics,
            templates,
            clock,
        }
    }
}

/// Build the dispatcher with every handler subscribed to its events.
pub fn wire_dispatcher(ports: &SideEffectPorts, queue: NotificationQueue) -> EventDispatcher {
    let user_cache = Arc::new(UserCacheInvalidation::new(Arc::clone(&ports.cache)));
    let proposal_cache = Arc::new(ProposalCacheInvalidation::new(Arc::clone(&ports.cache)));
    let notifications = Arc::new(NotificationHandler::new(
        Arc::clone(&ports.templates),
        queue,
    ));
    let report_clearing = Arc::new(ReportClearing::new(
        Arc::clone(&ports.accounts),
        Arc::clone(&ports.reports),
        Arc::clone(&ports.clock),
    ));
    let statistics_update = Arc::new(StatisticsUpdate::new(Arc::clone(&ports.statistics)));
    let statistics_init = Arc::new(StatisticsInitialization::new(Arc::clone(
        &ports.statistics,
    )));

    EventDispatcher::builder()
        .subscribe::<UserBanned>(user_cache.clone())
        .subscribe::<UserBanned>(notifications.clone())
        .subscribe::<UserBanned>(report_clearing)
        .subscribe::<UserUnlocked>(user_cache.clone())
        .subscribe::<UserUnlocked>(notifications.clone())
        .subscribe::<UserRegistered>(statistics_init)
        .subscribe::<UserRegistered>(notifications.clone())
        .subscribe::<PriceProposalEvaluated>(proposal_cache.clone())
        .subscribe::<PriceProposalEvaluated>(statistics_update)
        .subscribe::<PriceProposalEvaluated>(notifications.clone())
        .subscribe::<BanAutoExpired>(user_cache)
        .subscribe::<BanAutoExpired>(notifications.clone())
        .subscribe::<ProposalAutoExpired>(proposal_cache)
        .subscribe::<ProposalAutoExpired>(notifications)
        .build()
}

#[cfg(test)]
mod tests {
    //! Routing table coverage.
    use super::*;
    use crate::domain::ports::PlainTextTemplates;
    use crate::outbound::cache::InMemoryCacheStore;
    use crate::test_support::{InMemoryAccounts, InMemoryReports, InMemoryStatistics};
    use mockable::DefaultClock;
    use rstest::rstest;

    fn ports() -> SideEffectPorts {
        SideEffectPorts::new(
            Arc::new(InMemoryCacheStore::new()),
            Arc::new(InMemoryAccounts::default()),
            Arc::new(InMemoryReports::default()),
            Arc::new(InMemoryStatistics::default()),
            Arc::new(PlainTextTemplates),
            Arc::new(DefaultClock),
        )
    }

    #[rstest]
    fn routing_table_matches_documented_fan_out() {
        let (queue, _receiver) = NotificationQueue::bounded(4);
        let dispatcher = wire_dispatcher(&ports(), queue);

        assert_eq!(dispatcher.handler_count::<UserBanned>(), 3);
        assert_eq!(dispatcher.handler_count::<UserUnlocked>(), 2);
        assert_eq!(dispatcher.handler_count::<UserRegistered>(), 2);
        assert_eq!(dispatcher.handler_count::<PriceProposalEvaluated>(), 3);
        assert_eq!(dispatcher.handler_count::<BanAutoExpired>(), 2);
        assert_eq!(dispatcher.handler_count::<ProposalAutoExpired>(), 2);
    }
}
