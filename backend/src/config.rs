//! Side-effect subsystem configuration loaded via OrthoConfig.
//!
//! Values are read once at startup. Every field is optional; accessors fall
//! back to the defaults below.

use std::time::Duration;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_QUEUE_CAPACITY: usize = 256;
const DEFAULT_BAN_EXPIRY_INTERVAL_SECS: u64 = 300;
const DEFAULT_PROPOSAL_EXPIRY_INTERVAL_SECS: u64 = 3_600;
const DEFAULT_PROPOSAL_EXPIRY_WINDOW_HOURS: u32 = 24;
const DEFAULT_CACHE_TTL_SECS: u64 = 600;
const DEFAULT_CACHE_TTL_JITTER_SECS: u64 = 60;
const DEFAULT_MAIL_SENDER: &str = "no-reply@fuelwatch.invalid";
const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 10;

/// Configuration for the notification queue, reconciliation sweeps, cache,
/// and mail relay.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FUELWATCH")]
pub struct SideEffectSettings {
    /// Maximum number of undelivered notifications held in memory.
    pub notification_queue_capacity: Option<usize>,
    /// Seconds between ban-expiry sweeps.
    pub ban_expiry_interval_secs: Option<u64>,
    /// Seconds between proposal-expiry sweeps.
    pub proposal_expiry_interval_secs: Option<u64>,
    /// Age in hours after which a pending proposal is rejected.
    pub proposal_expiry_window_hours: Option<u32>,
    /// Base TTL for cache-aside entries.
    pub cache_ttl_secs: Option<u64>,
    /// Upper bound of the random extra added to each cache TTL.
    pub cache_ttl_jitter_secs: Option<u64>,
    /// Redis connection URL; the in-memory cache is used when absent.
    pub redis_url: Option<String>,
    /// Mail relay endpoint; notifications are only logged when absent.
    pub mail_relay_url: Option<String>,
    /// Sender address placed on outbound mail.
    pub mail_sender: Option<String>,
    /// Per-request timeout for the mail relay.
    pub mail_timeout_secs: Option<u64>,
}

impl SideEffectSettings {
    /// Queue capacity, never below one.
    pub fn queue_capacity(&self) -> usize {
        self.notification_queue_capacity
            .unwrap_or(DEFAULT_QUEUE_CAPACITY)
            .max(1)
    }

    /// Interval between ban-expiry sweeps, never below one second.
    pub fn ban_expiry_interval(&self) -> Duration {
        seconds(
            self.ban_expiry_interval_secs
                .unwrap_or(DEFAULT_BAN_EXPIRY_INTERVAL_SECS),
        )
    }

    /// Interval between proposal-expiry sweeps, never below one second.
    pub fn proposal_expiry_interval(&self) -> Duration {
        seconds(
            self.proposal_expiry_interval_secs
                .unwrap_or(DEFAULT_PROPOSAL_EXPIRY_INTERVAL_SECS),
        )
    }

    pub fn proposal_expiry_window(&self) -> TimeDelta {
        TimeDelta::hours(i64::from(
            self.proposal_expiry_window_hours
                .unwrap_or(DEFAULT_PROPOSAL_EXPIRY_WINDOW_HOURS),
        ))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS))
    }

    pub fn cache_ttl_jitter(&self) -> Duration {
        Duration::from_secs(
            self.cache_ttl_jitter_secs
                .unwrap_or(DEFAULT_CACHE_TTL_JITTER_SECS),
        )
    }

    pub fn mail_sender(&self) -> &str {
        self.mail_sender.as_deref().unwrap_or(DEFAULT_MAIL_SENDER)
    }

    pub fn mail_timeout(&self) -> Duration {
        seconds(self.mail_timeout_secs.unwrap_or(DEFAULT_MAIL_TIMEOUT_SECS))
    }
}

fn seconds(value: u64) -> Duration {
    Duration::from_secs(value.max(1))
}

#[cfg(test)]
mod tests {
    //! Unit tests for side-effect configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "FUELWATCH_NOTIFICATION_QUEUE_CAPACITY",
        "FUELWATCH_BAN_EXPIRY_INTERVAL_SECS",
        "FUELWATCH_PROPOSAL_EXPIRY_INTERVAL_SECS",
        "FUELWATCH_PROPOSAL_EXPIRY_WINDOW_HOURS",
        "FUELWATCH_CACHE_TTL_SECS",
        "FUELWATCH_CACHE_TTL_JITTER_SECS",
        "FUELWATCH_REDIS_URL",
        "FUELWATCH_MAIL_RELAY_URL",
        "FUELWATCH_MAIL_SENDER",
        "FUELWATCH_MAIL_TIMEOUT_SECS",
    ];

    fn load_from_empty_args() -> SideEffectSettings {
        SideEffectSettings::load_from_iter([OsString::from("fuelwatch")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.queue_capacity(), DEFAULT_QUEUE_CAPACITY);
        assert_eq!(settings.ban_expiry_interval(), Duration::from_secs(300));
        assert_eq!(settings.proposal_expiry_interval(), Duration::from_secs(3_600));
        assert_eq!(settings.proposal_expiry_window(), TimeDelta::hours(24));
        assert_eq!(settings.cache_ttl(), Duration::from_secs(600));
        assert_eq!(settings.cache_ttl_jitter(), Duration::from_secs(60));
        assert_eq!(settings.mail_sender(), DEFAULT_MAIL_SENDER);
        assert!(settings.redis_url.is_none());
        assert!(settings.mail_relay_url.is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(VARS.map(|name| {
            let value = match name {
                "FUELWATCH_NOTIFICATION_QUEUE_CAPACITY" => Some("16"),
                "FUELWATCH_BAN_EXPIRY_INTERVAL_SECS" => Some("30"),
                "FUELWATCH_PROPOSAL_EXPIRY_WINDOW_HOURS" => Some("48"),
                "FUELWATCH_REDIS_URL" => Some("redis://cache:6379"),
                "FUELWATCH_MAIL_SENDER" => Some("alerts@fuelwatch.example"),
                _ => None,
            };
            (name, value.map(str::to_owned))
        }));

        let settings = load_from_empty_args();
        assert_eq!(settings.queue_capacity(), 16);
        assert_eq!(settings.ban_expiry_interval(), Duration::from_secs(30));
        assert_eq!(settings.proposal_expiry_window(), TimeDelta::hours(48));
        assert_eq!(settings.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(settings.mail_sender(), "alerts@fuelwatch.example");
    }

    #[rstest]
    fn zero_values_are_clamped() {
        let settings = SideEffectSettings {
            notification_queue_capacity: Some(0),
            ban_expiry_interval_secs: Some(0),
            mail_timeout_secs: Some(0),
            ..SideEffectSettings::default()
        };
        assert_eq!(settings.queue_capacity(), 1);
        assert_eq!(settings.ban_expiry_interval(), Duration::from_secs(1));
        assert_eq!(settings.mail_timeout(), Duration::from_secs(1));
    }
}
