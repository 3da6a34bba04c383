//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Discord application identity (slash-command registration).
    #[serde(default)]
    pub discord: DiscordConfig,
    /// Outbound webhook targets.
    #[serde(default)]
    pub webhooks: WebhookConfig,
    /// BattleMetrics API access.
    #[serde(default)]
    pub api: ApiConfig,
    /// Watchlist polling and persistence.
    #[serde(default)]
    pub watch: WatchConfig,
    /// Command endpoint and metrics listener.
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a TOML file if it exists, then apply
    /// environment overrides from the process environment.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults and environment");
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Empty values are ignored so that a blank `.env` line does not wipe a
    /// value set in the file.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("BOT_TOKEN") {
            self.discord.token = Some(v);
        }
        if let Some(v) = get("DISCORD_CLIENT_ID") {
            self.discord.application_id = Some(v);
        }
        if let Some(v) = get("GUILD_ID") {
            self.discord.guild_id = Some(v);
        }
        if let Some(v) = get("WEBHOOK_PLAYER_ALERT") {
            self.webhooks.player_alert = Some(v);
        }
        if let Some(v) = get("WEBHOOK_LOGGING") {
            self.webhooks.logging = Some(v);
        }
        if let Some(v) = get("BATTLEMETRICS_TOKEN") {
            self.api.token = Some(v);
        }
        if let Some(v) = get("CHECK_INTERVAL") {
            self.watch.check_interval_ms =
                v.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    var: "CHECK_INTERVAL",
                    value: v.clone(),
                })?;
        }
        Ok(())
    }
}

/// Discord application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Bot token.
    pub token: Option<String>,
    /// Application (client) ID used for command registration.
    pub application_id: Option<String>,
    /// Optional guild for faster guild-scoped command registration.
    pub guild_id: Option<String>,
    /// Discord REST base URL.
    #[serde(default = "default_discord_api_url")]
    pub api_url: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            application_id: None,
            guild_id: None,
            api_url: default_discord_api_url(),
        }
    }
}

/// Webhook targets. Unset targets disable that channel.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookConfig {
    /// Receives online/offline/server-change alerts.
    pub player_alert: Option<String>,
    /// Receives watch added/removed audit events.
    pub logging: Option<String>,
}

/// BattleMetrics API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Bearer token for the authenticated search endpoint.
    pub token: Option<String>,
    /// Base URL for authenticated calls (player search).
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Base URL for unauthenticated player lookups (defaults to `base_url`).
    pub public_base_url: Option<String>,
    /// Per-request timeout in seconds (default: 10).
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Base URL used for the public player endpoint.
    pub fn public_base_url(&self) -> &str {
        self.public_base_url.as_deref().unwrap_or(&self.base_url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_api_base_url(),
            public_base_url: None,
            timeout_secs: default_api_timeout(),
        }
    }
}

/// Watchlist configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Poll interval in milliseconds (default: 60000).
    #[serde(default = "default_check_interval")]
    pub check_interval_ms: u64,
    /// Path to the persisted watchlist document.
    #[serde(default = "default_watchlist_path")]
    pub watchlist_path: String,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: default_check_interval(),
            watchlist_path: default_watchlist_path(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Serve `/commands`, `/metrics` and `/health` (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Address to bind to (default: 127.0.0.1:8080).
    #[serde(default = "default_http_address")]
    pub address: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            address: default_http_address(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_discord_api_url() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_api_base_url() -> String {
    "https://api.battlemetrics.com".to_string()
}

fn default_api_timeout() -> u64 {
    10
}

fn default_check_interval() -> u64 {
    60_000
}

fn default_watchlist_path() -> String {
    "watchlist.json".to_string()
}

fn default_http_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}
