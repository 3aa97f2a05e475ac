//! Proposal statistics maintenance.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::dispatcher::{EventHandler, HandlerError};
use crate::domain::events::{PriceProposalEvaluated, UserRegistered};
use crate::domain::ports::StatisticsRepository;
use crate::domain::ProposalStatistics;

/// Counts a verdict against the author's statistics record.
///
/// Authors without a record are skipped: statistics are only tracked once
/// [`StatisticsInitialization`] has created the record at registration.
pub struct StatisticsUpdate {
    statistics: Arc<dyn StatisticsRepository>,
}

impl StatisticsUpdate {
    pub fn new(statistics: Arc<dyn StatisticsRepository>) -> Self {
        Self { statistics }
    }
}

#[async_trait]
impl EventHandler<PriceProposalEvaluated> for StatisticsUpdate {
    fn name(&self) -> &'static str {
        "statistics_update"
    }

    async fn handle(&self, event: &PriceProposalEvaluated) -> Result<(), HandlerError> {
        let author = &event.proposal.author;
        let Some(mut stats) = self.statistics.find(&author.id).await? else {
            warn!(user_id = %author.id, "no statistics record for author; verdict not counted");
            return Ok(());
        };

        stats.record_verdict(event.accepted);
        self.statistics.save(&stats).await?;
        debug!(
            user_id = %author.id,
            total = stats.total_proposals,
            rate = stats.acceptance_rate,
            "proposal statistics updated"
        );
        Ok(())
    }
}

/// Creates a zeroed statistics record for a newly registered user.
pub struct StatisticsInitialization {
    statistics: Arc<dyn StatisticsRepository>,
}

impl StatisticsInitialization {
    pub fn new(statistics: Arc<dyn StatisticsRepository>) -> Self {
        Self { statistics }
    }
}

#[async_trait]
impl EventHandler<UserRegistered> for StatisticsInitialization {
    fn name(&self) -> &'static str {
        "statistics_initialization"
    }

    async fn handle(&self, event: &UserRegistered) -> Result<(), HandlerError> {
        let user_id = event.user.id;
        if self.statistics.find(&user_id).await?.is_some() {
            debug!(%user_id, "statistics record already exists");
            return Ok(());
        }
        self.statistics
            .save(&ProposalStatistics::zeroed(user_id))
            .await?;
        info!(%user_id, "statistics record initialised");
        Ok(())
    }
}
