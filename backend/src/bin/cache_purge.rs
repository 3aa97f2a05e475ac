//! Operator tool deleting every cache entry under a key prefix.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use fuelwatch::SideEffectSettings;
use fuelwatch::domain::CachePrefix;
use fuelwatch::domain::ports::CacheStore;
use fuelwatch::outbound::cache::RedisCacheStore;
use fuelwatch::telemetry::init_tracing;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::info;

/// `cache-purge` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cache-purge",
    about = "Delete every cache entry whose key starts with a prefix",
    version
)]
struct CliArgs {
    /// Key prefix, e.g. `users-list` or `station:<id>`.
    #[arg(long, value_name = "prefix")]
    prefix: String,
    /// Redis URL. Falls back to `FUELWATCH_REDIS_URL` when omitted.
    #[arg(long = "redis-url", value_name = "url")]
    redis_url: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build cache-purge runtime")?;
    runtime.block_on(purge(args))
}

async fn purge(args: CliArgs) -> Result<()> {
    let prefix = CachePrefix::new(args.prefix).wrap_err("invalid prefix")?;
    let redis_url = match args.redis_url {
        Some(url) => url,
        None => SideEffectSettings::load_from_iter([OsString::from("cache-purge")])
            .map_err(|err| eyre!("failed to load settings: {err}"))?
            .redis_url
            .ok_or_else(|| eyre!("no --redis-url given and FUELWATCH_REDIS_URL is unset"))?,
    };

    let store = RedisCacheStore::connect(&redis_url, 1)
        .await
        .wrap_err("failed to connect to redis")?;
    let removed = store
        .delete_by_prefix(&prefix)
        .await
        .wrap_err_with(|| format!("failed to purge prefix {prefix}"))?;
    info!(%prefix, removed, "cache prefix purged");
    println!("removed {removed} keys matching {prefix}*");
    Ok(())
}
