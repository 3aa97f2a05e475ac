//! In-memory port implementations backed by mutex-guarded maps.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, BanExpiry, BanRepository, BanRepositoryError,
    ProposalRepository, ProposalRepositoryError, ReportRepository, ReportRepositoryError,
    StatisticsRepository, StatisticsRepositoryError,
};
use crate::domain::{
    AdminSummary, BanRecord, PriceProposal, ProposalStatistics, ProposalStatus, ReportStatus,
    UserAccount, UserId, UserReport,
};

struct Table<K, V>(Mutex<HashMap<K, V>>);

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self(Mutex::new(HashMap::new()))
    }
}

impl<K: Eq + Hash, V: Clone> Table<K, V> {
    fn lock(&self) -> MutexGuard<'_, HashMap<K, V>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn put(&self, key: K, value: V) {
        self.lock().insert(key, value);
    }

    fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    fn select(&self, predicate: impl Fn(&V) -> bool) -> Vec<V> {
        self.lock()
            .values()
            .filter(|value| predicate(value))
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct InMemoryAccounts {
    accounts: Table<UserId, UserAccount>,
    admins: Table<UserId, AdminSummary>,
}

impl InMemoryAccounts {
    pub fn insert_account(&self, account: UserAccount) {
        self.accounts.put(account.user.id, account);
    }

    pub fn insert_admin(&self, admin: AdminSummary) {
        self.admins.put(admin.id, admin);
    }

    pub fn account(&self, user_id: &UserId) -> Option<UserAccount> {
        self.accounts.get(user_id)
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccounts {
    async fn find_account(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserAccount>, AccountRepositoryError> {
        Ok(self.accounts.get(user_id))
    }

    async fn find_admin(
        &self,
        admin_id: &UserId,
    ) -> Result<Option<AdminSummary>, AccountRepositoryError> {
        Ok(self.admins.get(admin_id))
    }
}

/// Ban store that writes unlocked accounts through to [`InMemoryAccounts`].
pub struct InMemoryBans {
    bans: Table<Uuid, BanRecord>,
    accounts: Arc<InMemoryAccounts>,
}

impl InMemoryBans {
    pub fn new(accounts: Arc<InMemoryAccounts>) -> Self {
        Self {
            bans: Table::default(),
            accounts,
        }
    }

    pub fn insert(&self, ban: BanRecord) {
        self.bans.put(ban.id, ban);
    }

    pub fn get(&self, id: Uuid) -> Option<BanRecord> {
        self.bans.get(&id)
    }
}

#[async_trait]
impl BanRepository for InMemoryBans {
    async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<BanRecord>, BanRepositoryError> {
        Ok(self.bans.select(|ban| ban.is_expired_at(now)))
    }

    async fn save_expired(&self, expiries: &[BanExpiry]) -> Result<(), BanRepositoryError> {
        for expiry in expiries {
            self.bans.put(expiry.ban.id, expiry.ban.clone());
            if let Some(account) = &expiry.account {
                self.accounts.insert_account(account.clone());
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryReports {
    reports: Table<Uuid, UserReport>,
}

impl InMemoryReports {
    pub fn insert(&self, report: UserReport) {
        self.reports.put(report.id, report);
    }

    pub fn get(&self, id: Uuid) -> Option<UserReport> {
        self.reports.get(&id)
    }
}

#[async_trait]
impl ReportRepository for InMemoryReports {
    async fn find_pending_against(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserReport>, ReportRepositoryError> {
        Ok(self.reports.select(|report| {
            report.reported_user_id == *user_id && report.status == ReportStatus::Pending
        }))
    }

    async fn save_all(&self, reports: &[UserReport]) -> Result<(), ReportRepositoryError> {
        for report in reports {
            self.reports.put(report.id, report.clone());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryStatistics {
    records: Table<UserId, ProposalStatistics>,
}

#[async_trait]
impl StatisticsRepository for InMemoryStatistics {
    async fn find(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ProposalStatistics>, StatisticsRepositoryError> {
        Ok(self.records.get(user_id))
    }

    async fn save(&self, statistics: &ProposalStatistics) -> Result<(), StatisticsRepositoryError> {
        self.records.put(statistics.user_id, statistics.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProposals {
    proposals: Table<Uuid, PriceProposal>,
}

impl InMemoryProposals {
    pub fn insert(&self, proposal: PriceProposal) {
        self.proposals.put(proposal.id, proposal);
    }

    pub fn get(&self, id: Uuid) -> Option<PriceProposal> {
        self.proposals.get(&id)
    }
}

#[async_trait]
impl ProposalRepository for InMemoryProposals {
    async fn find_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<PriceProposal>, ProposalRepositoryError> {
        Ok(self.proposals.select(|proposal| {
            proposal.status == ProposalStatus::Pending && proposal.created_at < cutoff
        }))
    }

    async fn save_all(&self, proposals: &[PriceProposal]) -> Result<(), ProposalRepositoryError> {
        for proposal in proposals {
            self.proposals.put(proposal.id, proposal.clone());
        }
        Ok(())
    }
}
