//! bmwatch - BattleMetrics player watchlist daemon.
//!
//! Polls presence for a list of watched SteamIDs and posts Discord alerts when
//! a player comes online, goes offline or changes servers.

mod api;
mod commands;
mod config;
mod engine;
mod error;
mod http;
mod metrics;
mod notify;
mod resolver;
mod store;
mod telemetry;
#[cfg(test)]
mod testing;

use crate::api::{BattleMetricsClient, PlayerApi};
use crate::commands::WatchService;
use crate::config::Config;
use crate::engine::Reconciler;
use crate::notify::{Notifier, WebhookNotifier};
use crate::resolver::IdentityResolver;
use crate::store::WatchlistStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let mut args = std::env::args().skip(1).peekable();
    let register = args.next_if(|a| a == "register-commands").is_some();
    let config_path = args.next().unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load_with_env(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if register {
        return register_commands(&config).await;
    }

    if let Err(errors) = config::validation::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s), refusing to start", errors.len());
    }

    info!(
        interval_ms = config.watch.check_interval_ms,
        watchlist = %config.watch.watchlist_path,
        "Starting bmwatch"
    );
    if config.webhooks.player_alert.is_none() {
        warn!("webhooks.player_alert not set, player alerts will be dropped");
    }

    metrics::init();

    let store = Arc::new(WatchlistStore::open(&config.watch.watchlist_path).await?);
    let api: Arc<dyn PlayerApi> = Arc::new(BattleMetricsClient::new(&config.api));
    let notifier: Arc<dyn Notifier> = Arc::new(WebhookNotifier::new(&config.webhooks));
    let resolver = Arc::new(IdentityResolver::new(api.clone()));
    let reconciler = Arc::new(Reconciler::new(
        store.clone(),
        resolver.clone(),
        api.clone(),
        notifier.clone(),
    ));
    let service = Arc::new(WatchService::new(
        store,
        resolver,
        api,
        notifier,
        reconciler.clone(),
    ));

    let interval = Duration::from_millis(config.watch.check_interval_ms);
    let poll = reconciler.spawn_poll_task(interval);
    info!(interval_ms = config.watch.check_interval_ms, "Poll task started");

    if config.http.enabled {
        tokio::select! {
            result = http::run_http_server(config.http.address, service) => result?,
            _ = tokio::signal::ctrl_c() => info!("Shutdown requested"),
        }
    } else {
        info!("HTTP server disabled");
        tokio::signal::ctrl_c().await?;
        info!("Shutdown requested");
    }

    poll.abort();
    Ok(())
}

/// `bmwatch register-commands [config]`
async fn register_commands(config: &Config) -> anyhow::Result<()> {
    if let Err(errors) = config::validation::validate_registration(config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s)", errors.len());
    }

    match commands::registration::register_commands(&config.discord).await {
        Ok(count) => {
            info!(count, "Successfully registered application commands");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Failed to register commands");
            Err(e.into())
        }
    }
}
