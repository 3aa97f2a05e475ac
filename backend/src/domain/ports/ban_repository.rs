//! Port for ban persistence used by the ban-expiry sweep.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;
use crate::domain::{BanRecord, UserAccount};

define_port_error! {
    /// Errors raised by ban repository adapters.
    pub enum BanRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "ban repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "ban repository query failed: {message}",
    }
}

/// One lifted ban together with the unlocked account, persisted atomically.
///
/// `account` is `None` when the banned account no longer exists; only the
/// ban is written then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanExpiry {
    pub ban: BanRecord,
    pub account: Option<UserAccount>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BanRepository: Send + Sync {
    /// Bans with `active == true` and `expires_at <= now`.
    async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<BanRecord>, BanRepositoryError>;

    /// Persist every transition produced by one sweep.
    async fn save_expired(&self, expiries: &[BanExpiry]) -> Result<(), BanRepositoryError>;
}
