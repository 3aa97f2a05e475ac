//! Port for reports filed against users.
use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{UserId, UserReport};

define_port_error! {
    /// Errors raised by report repository adapters.
    pub enum ReportRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "report repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "report repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Reports against `user_id` still awaiting review.
    async fn find_pending_against(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserReport>, ReportRepositoryError>;

    /// Persist updated reports.
    async fn save_all(&self, reports: &[UserReport]) -> Result<(), ReportRepositoryError>;
}
