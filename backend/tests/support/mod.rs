//! Shared harness wiring every port to its in-memory double.
#![allow(dead_code, reason = "each test binary uses a subset of the harness")]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use fuelwatch::domain::ports::PlainTextTemplates;
use fuelwatch::domain::{AdminSummary, CacheKey, SideEffectPorts, UserAccount, UserSummary};
use fuelwatch::outbound::cache::InMemoryCacheStore;
use fuelwatch::test_support::fixtures::admin;
use fuelwatch::test_support::{
    InMemoryAccounts, InMemoryBans, InMemoryProposals, InMemoryReports, InMemoryStatistics,
    MutableClock, RecordingTransport,
};
use fuelwatch::{BackgroundServices, ReconciliationPorts, SideEffectSettings};

pub const DELIVERY_DEADLINE: Duration = Duration::from_secs(2);

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0)
        .single()
        .expect("valid time")
}

pub struct World {
    pub cache: Arc<InMemoryCacheStore>,
    pub accounts: Arc<InMemoryAccounts>,
    pub bans: Arc<InMemoryBans>,
    pub reports: Arc<InMemoryReports>,
    pub statistics: Arc<InMemoryStatistics>,
    pub proposals: Arc<InMemoryProposals>,
    pub transport: Arc<RecordingTransport>,
    pub clock: Arc<MutableClock>,
    pub admin: AdminSummary,
}

impl World {
    pub fn new() -> Self {
        let accounts = Arc::new(InMemoryAccounts::default());
        let admin = admin();
        accounts.insert_admin(admin.clone());
        Self {
            cache: Arc::new(InMemoryCacheStore::new()),
            bans: Arc::new(InMemoryBans::new(Arc::clone(&accounts))),
            accounts,
            reports: Arc::new(InMemoryReports::default()),
            statistics: Arc::new(InMemoryStatistics::default()),
            proposals: Arc::new(InMemoryProposals::default()),
            transport: Arc::new(RecordingTransport::default()),
            clock: Arc::new(MutableClock::new(fixed_now())),
            admin,
        }
    }

    /// Start the background services with sweep intervals long enough that
    /// they never fire during a test unless time is advanced.
    pub fn start(&self, settings: &SideEffectSettings) -> BackgroundServices {
        let ports = SideEffectPorts::new(
            self.cache.clone(),
            self.accounts.clone(),
            self.reports.clone(),
            self.statistics.clone(),
            Arc::new(PlainTextTemplates),
            self.clock.clone(),
        );
        let reconciliation = ReconciliationPorts {
            bans: self.bans.clone(),
            proposals: self.proposals.clone(),
        };
        BackgroundServices::start(settings, ports, reconciliation, self.transport.clone())
    }

    pub fn register(&self, user: &UserSummary, account: UserAccount) {
        debug_assert_eq!(user.id, account.user.id);
        self.accounts.insert_account(account);
    }

    pub async fn seed_cache(&self, keys: &[&str]) {
        use fuelwatch::domain::ports::CacheStore;
        for key in keys {
            self.cache
                .set(
                    &CacheKey::new(*key).expect("valid key"),
                    "cached",
                    Duration::from_secs(3_600),
                )
                .await
                .expect("seed cache");
        }
    }

    pub async fn cached(&self, key: &str) -> bool {
        use fuelwatch::domain::ports::CacheStore;
        self.cache
            .get(&CacheKey::new(key).expect("valid key"))
            .await
            .expect("read cache")
            .is_some()
    }
}

pub fn quiet_settings() -> SideEffectSettings {
    SideEffectSettings {
        notification_queue_capacity: Some(8),
        ban_expiry_interval_secs: Some(86_400),
        proposal_expiry_interval_secs: Some(86_400),
        ..SideEffectSettings::default()
    }
}
