//! Settings-driven selection of the cache store and notification transport.
//!
//! A configured endpoint gets the real adapter; an absent one falls back to
//! the in-process implementation so a single node runs without Redis or a
//! mail relay.

use std::sync::Arc;

use reqwest::Url;
use tracing::info;

use super::cache::{InMemoryCacheStore, RedisCacheStore};
use super::mail::{HttpMailRelay, LogOnlyTransport};
use crate::config::SideEffectSettings;
use crate::domain::CacheAside;
use crate::domain::ports::{CacheStore, CacheStoreError, NotificationTransport};

const REDIS_POOL_SIZE: u32 = 8;

/// Which cache store was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    InMemory,
}

/// Which notification transport was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailBackend {
    HttpRelay,
    LogOnly,
}

/// Adapters could not be built from the configured endpoints.
#[derive(Debug, thiserror::Error)]
pub enum OutboundSetupError {
    #[error("redis cache unavailable: {0}")]
    Cache(#[from] CacheStoreError),
    #[error("invalid mail relay url {url:?}: {message}")]
    RelayUrl { url: String, message: String },
    #[error("mail relay client could not be built: {0}")]
    RelayClient(#[from] reqwest::Error),
}

/// Cache store and notification transport chosen for this process.
pub struct OutboundAdapters {
    pub cache: Arc<dyn CacheStore>,
    pub cache_backend: CacheBackend,
    pub transport: Arc<dyn NotificationTransport>,
    pub mail_backend: MailBackend,
}

impl OutboundAdapters {
    /// Build adapters from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`OutboundSetupError`] when a configured Redis URL cannot be
    /// connected to, or a configured relay URL is malformed.
    pub async fn from_settings(settings: &SideEffectSettings) -> Result<Self, OutboundSetupError> {
        let (cache, cache_backend) = match &settings.redis_url {
            Some(url) => (
                Arc::new(RedisCacheStore::connect(url, REDIS_POOL_SIZE).await?)
                    as Arc<dyn CacheStore>,
                CacheBackend::Redis,
            ),
            None => (
                Arc::new(InMemoryCacheStore::new()) as Arc<dyn CacheStore>,
                CacheBackend::InMemory,
            ),
        };
        let (transport, mail_backend) = transport_from_settings(settings)?;

        info!(
            cache = ?cache_backend,
            mail = ?mail_backend,
            "outbound adapters selected"
        );
        Ok(Self {
            cache,
            cache_backend,
            transport,
            mail_backend,
        })
    }

    /// Cache-aside reader over the selected store with the configured TTL.
    pub fn cache_aside(&self, settings: &SideEffectSettings) -> CacheAside {
        CacheAside::new(
            Arc::clone(&self.cache),
            settings.cache_ttl(),
            settings.cache_ttl_jitter(),
        )
    }
}

fn transport_from_settings(
    settings: &SideEffectSettings,
) -> Result<(Arc<dyn NotificationTransport>, MailBackend), OutboundSetupError> {
    let Some(raw) = settings.mail_relay_url.as_deref() else {
        return Ok((
            Arc::new(LogOnlyTransport) as Arc<dyn NotificationTransport>,
            MailBackend::LogOnly,
        ));
    };
    let endpoint = Url::parse(raw).map_err(|err| OutboundSetupError::RelayUrl {
        url: raw.to_owned(),
        message: err.to_string(),
    })?;
    let relay = HttpMailRelay::new(endpoint, settings.mail_sender(), settings.mail_timeout())?;
    Ok((
        Arc::new(relay) as Arc<dyn NotificationTransport>,
        MailBackend::HttpRelay,
    ))
}

#[cfg(test)]
mod tests {
    //! Adapter selection without network access.
    use super::*;
    use crate::domain::CacheKey;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    #[tokio::test]
    async fn unset_endpoints_select_in_process_adapters() {
        let settings = SideEffectSettings {
            cache_ttl_secs: Some(30),
            cache_ttl_jitter_secs: Some(0),
            ..SideEffectSettings::default()
        };

        let adapters = OutboundAdapters::from_settings(&settings)
            .await
            .expect("in-process adapters");
        assert_eq!(adapters.cache_backend, CacheBackend::InMemory);
        assert_eq!(adapters.mail_backend, MailBackend::LogOnly);

        let key = CacheKey::new("top-users").expect("valid key");
        let value: u32 = adapters
            .cache_aside(&settings)
            .get_or_load(&key, || async { Ok::<_, std::convert::Infallible>(7) })
            .await
            .expect("load");
        assert_eq!(value, 7);
        assert_eq!(
            adapters.cache.get(&key).await.expect("get").as_deref(),
            Some("7")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn relay_url_selects_the_http_relay() {
        let settings = SideEffectSettings {
            mail_relay_url: Some("http://relay.internal:8025/send".to_owned()),
            mail_timeout_secs: Some(3),
            ..SideEffectSettings::default()
        };

        let adapters = OutboundAdapters::from_settings(&settings)
            .await
            .expect("relay adapter");
        assert_eq!(adapters.mail_backend, MailBackend::HttpRelay);
        assert_eq!(adapters.cache_backend, CacheBackend::InMemory);
        assert_eq!(settings.mail_timeout(), Duration::from_secs(3));
    }

    #[rstest]
    #[case("not a url")]
    #[case("relay.internal/send")]
    fn malformed_relay_url_is_rejected(#[case] raw: &str) {
        let settings = SideEffectSettings {
            mail_relay_url: Some(raw.to_owned()),
            ..SideEffectSettings::default()
        };

        let err = transport_from_settings(&settings)
            .err()
            .expect("malformed url rejected");
        assert!(matches!(err, OutboundSetupError::RelayUrl { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_redis_url_is_a_cache_error() {
        let settings = SideEffectSettings {
            redis_url: Some("definitely-not-redis".to_owned()),
            ..SideEffectSettings::default()
        };

        let err = OutboundAdapters::from_settings(&settings)
            .await
            .err()
            .expect("malformed redis url rejected");
        assert!(matches!(err, OutboundSetupError::Cache(_)));
    }
}
