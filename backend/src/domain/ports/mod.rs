//! Domain ports for every collaborator the side-effect core talks to.

mod macros;
pub(crate) use macros::define_port_error;

mod account_repository;
mod ban_repository;
mod cache_store;
mod notification_templates;
mod notification_transport;
mod proposal_repository;
mod report_repository;
mod statistics_repository;

#[cfg(test)]
pub use account_repository::MockAccountRepository;
pub use account_repository::{AccountRepository, AccountRepositoryError};
#[cfg(test)]
pub use ban_repository::MockBanRepository;
pub use ban_repository::{BanExpiry, BanRepository, BanRepositoryError};
#[cfg(test)]
pub use cache_store::MockCacheStore;
pub use cache_store::{CacheStore, CacheStoreError};
pub use notification_templates::{
    Notice, NotificationTemplates, PlainTextTemplates, RenderedNotification,
};
#[cfg(test)]
pub use notification_transport::MockNotificationTransport;
pub use notification_transport::{NotificationTransport, NotificationTransportError};
#[cfg(test)]
pub use proposal_repository::MockProposalRepository;
pub use proposal_repository::{ProposalRepository, ProposalRepositoryError};
#[cfg(test)]
pub use report_repository::MockReportRepository;
pub use report_repository::{ReportRepository, ReportRepositoryError};
#[cfg(test)]
pub use statistics_repository::MockStatisticsRepository;
pub use statistics_repository::{StatisticsRepository, StatisticsRepositoryError};
