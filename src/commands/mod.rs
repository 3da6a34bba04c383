//! Watchlist command handlers.
//!
//! Every invocation produces exactly one [`Reply`]. Handler errors are
//! converted to a reply at the [`WatchService::handle`] boundary and never
//! reach the transport.

pub mod force_check;
pub mod list;
pub mod registration;
pub mod remove;
pub mod status;
pub mod watch;

use crate::api::{PlayerApi, PlayerStatus};
use crate::engine::Reconciler;
use crate::error::{ApiError, CommandError, CommandResult};
use crate::notify::{Embed, Notifier};
use crate::resolver::{IdentityResolver, Resolved};
use crate::store::WatchlistStore;
use crate::telemetry::{CommandTimer, spans};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{Instrument, error, warn};

/// Name of the player identifier option.
pub const STEAM_ID: &str = "steam_id";

/// An inbound command invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Invocation {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub user: String,
    #[serde(default, deserialize_with = "scalar_options")]
    pub options: HashMap<String, String>,
}

/// Accept numbers and booleans as option values; transports do not always
/// quote a SteamID. Other non-string values are dropped.
fn scalar_options<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<HashMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((name, value))
        })
        .collect())
}

impl Invocation {
    /// Option value, trimmed. Blank values count as absent.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Invoking user, or "Unknown" if the transport sent none.
    pub fn user(&self) -> &str {
        let user = self.user.trim();
        if user.is_empty() { "Unknown" } else { user }
    }

    fn require(&self, name: &'static str) -> CommandResult<&str> {
        self.option(name).ok_or(CommandError::MissingArgument(name))
    }
}

/// Reply to a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub content: Option<String>,
    /// Visible only to the invoker.
    pub ephemeral: bool,
    pub embed: Option<Embed>,
}

impl Reply {
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ephemeral: false,
            embed: None,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ephemeral: true,
            embed: None,
        }
    }

    pub fn with_embed(embed: Embed, ephemeral: bool) -> Self {
        Self {
            content: None,
            ephemeral,
            embed: Some(embed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Watch,
    Remove,
    List,
    Status,
    ForceCheck,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Self::Watch,
        Self::Remove,
        Self::List,
        Self::Status,
        Self::ForceCheck,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Watch => "watch",
            Self::Remove => "remove",
            Self::List => "list",
            Self::Status => "status",
            Self::ForceCheck => "force_check",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Watch => "Add a SteamID to the watchlist",
            Self::Remove => "Remove a SteamID from the watchlist",
            Self::List => "Lists all SteamIDs currently on the watchlist",
            Self::Status => "Check the current online/offline status of a player",
            Self::ForceCheck => "Force check all monitored players for online status",
        }
    }

    /// Whether the command takes a `steam_id` option.
    pub fn takes_steam_id(self) -> bool {
        matches!(self, Self::Watch | Self::Remove | Self::Status)
    }
}

/// Command front end over the shared watchlist components.
pub struct WatchService {
    store: Arc<WatchlistStore>,
    resolver: Arc<IdentityResolver>,
    api: Arc<dyn PlayerApi>,
    notifier: Arc<dyn Notifier>,
    reconciler: Arc<Reconciler>,
}

impl WatchService {
    pub fn new(
        store: Arc<WatchlistStore>,
        resolver: Arc<IdentityResolver>,
        api: Arc<dyn PlayerApi>,
        notifier: Arc<dyn Notifier>,
        reconciler: Arc<Reconciler>,
    ) -> Self {
        Self {
            store,
            resolver,
            api,
            notifier,
            reconciler,
        }
    }

    /// Handle one invocation. Always returns a reply.
    pub async fn handle(&self, invocation: Invocation) -> Reply {
        let Some(command) = Command::parse(&invocation.command) else {
            let err = CommandError::UnknownCommand(invocation.command.clone());
            warn!(command = %invocation.command, user = %invocation.user(), "Unknown command");
            crate::metrics::record_command_error("unknown", err.error_code());
            return Reply::ephemeral(err.reply_text());
        };

        let _timer = CommandTimer::new(command.name());
        let span = spans::command(
            command.name(),
            invocation.user(),
            invocation.option(STEAM_ID),
        );

        match self.execute(command, &invocation).instrument(span).await {
            Ok(reply) => reply,
            Err(e) => {
                match &e {
                    CommandError::MissingArgument(_) => {
                        warn!(command = command.name(), error = %e, "Rejected command")
                    }
                    _ => error!(command = command.name(), error = %e, "Command failed"),
                }
                crate::metrics::record_command_error(command.name(), e.error_code());
                Reply::ephemeral(e.reply_text())
            }
        }
    }

    async fn execute(&self, command: Command, invocation: &Invocation) -> CommandResult<Reply> {
        let user = invocation.user();
        match command {
            Command::Watch => watch::handle_watch(self, user, invocation.require(STEAM_ID)?).await,
            Command::Remove => {
                remove::handle_remove(self, user, invocation.require(STEAM_ID)?).await
            }
            Command::List => list::handle_list(&self.store).await,
            Command::Status => status::handle_status(self, invocation.require(STEAM_ID)?).await,
            Command::ForceCheck => force_check::handle_force_check(self, user).await,
        }
    }
}

/// Resolve a SteamID and fetch its current presence.
///
/// Uses the same resolution and detection path as the reconciliation pass.
pub(crate) async fn lookup_player(
    resolver: &IdentityResolver,
    api: &dyn PlayerApi,
    steam_id: &str,
    cached_handle: Option<&str>,
) -> Result<(Resolved, PlayerStatus), ApiError> {
    let resolved = resolver.resolve(steam_id, cached_handle).await?;
    let status = api.fetch_status(&resolved.handle).await?;
    Ok((resolved, status))
}
