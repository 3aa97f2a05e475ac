//! Port for per-author proposal statistics.
use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{ProposalStatistics, UserId};

define_port_error! {
    /// Errors raised by statistics repository adapters.
    pub enum StatisticsRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "statistics repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "statistics repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// Fetch the statistics record of `user_id`, if one was initialised.
    async fn find(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ProposalStatistics>, StatisticsRepositoryError>;

    /// Insert or replace a statistics record.
    async fn save(&self, statistics: &ProposalStatistics) -> Result<(), StatisticsRepositoryError>;
}
