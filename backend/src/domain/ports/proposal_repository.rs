//! Port for price proposal persistence used by the proposal-expiry sweep.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;
use crate::domain::PriceProposal;

define_port_error! {
    /// Errors raised by proposal repository adapters.
    pub enum ProposalRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "proposal repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "proposal repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProposalRepository: Send + Sync {
    /// Pending proposals created strictly before `cutoff`.
    async fn find_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<PriceProposal>, ProposalRepositoryError>;

    /// Persist every transition produced by one sweep.
    async fn save_all(&self, proposals: &[PriceProposal]) -> Result<(), ProposalRepositoryError>;
}
