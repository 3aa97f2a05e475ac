//! Port for reading user accounts and administrator identities.
use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{AdminSummary, UserAccount, UserId};

define_port_error! {
    /// Errors raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "account repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fetch the lockout state of a user account.
    async fn find_account(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserAccount>, AccountRepositoryError>;

    /// Fetch an administrator by identifier; `None` when the id is unknown or
    /// does not belong to an administrator.
    async fn find_admin(
        &self,
        admin_id: &UserId,
    ) -> Result<Option<AdminSummary>, AccountRepositoryError>;
}
