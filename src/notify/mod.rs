//! Outbound notifications.
//!
//! Transition alerts and watchlist audit events are delivered best-effort:
//! a failed delivery is logged and counted, never retried, and never undoes
//! the state change that produced it.

pub mod embed;
pub mod webhook;

pub use embed::Embed;
pub use webhook::WebhookNotifier;

use crate::api::rcon_search_url;
use crate::error::DispatchError;
use async_trait::async_trait;
use embed::{COLOR_ADDED, COLOR_CHANGED, COLOR_OFFLINE, COLOR_ONLINE, COLOR_REMOVED};
use tracing::{debug, warn};

/// Which webhook an event goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Online/offline/server-change alerts.
    PlayerAlert,
    /// Watch added/removed audit log.
    Logging,
}

impl Channel {
    pub fn label(self) -> &'static str {
        match self {
            Self::PlayerAlert => "player_alert",
            Self::Logging => "logging",
        }
    }
}

/// A notification-worthy event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CameOnline {
        steam_id: String,
        name: Option<String>,
        server: String,
    },
    WentOffline {
        steam_id: String,
        name: Option<String>,
        last_server: Option<String>,
    },
    ChangedServer {
        steam_id: String,
        name: Option<String>,
        from: String,
        to: String,
    },
    WatchAdded {
        steam_id: String,
        name: Option<String>,
        added_by: String,
    },
    WatchRemoved {
        steam_id: String,
        name: Option<String>,
        added_by: String,
        removed_by: String,
    },
}

impl Event {
    /// Static event name for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CameOnline { .. } => "came_online",
            Self::WentOffline { .. } => "went_offline",
            Self::ChangedServer { .. } => "changed_server",
            Self::WatchAdded { .. } => "watch_added",
            Self::WatchRemoved { .. } => "watch_removed",
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            Self::CameOnline { .. } | Self::WentOffline { .. } | Self::ChangedServer { .. } => {
                Channel::PlayerAlert
            }
            Self::WatchAdded { .. } | Self::WatchRemoved { .. } => Channel::Logging,
        }
    }

    pub fn steam_id(&self) -> &str {
        match self {
            Self::CameOnline { steam_id, .. }
            | Self::WentOffline { steam_id, .. }
            | Self::ChangedServer { steam_id, .. }
            | Self::WatchAdded { steam_id, .. }
            | Self::WatchRemoved { steam_id, .. } => steam_id,
        }
    }

    /// Render as a Discord embed.
    pub fn to_embed(&self) -> Embed {
        let player = |name: &Option<String>| name.clone().unwrap_or_else(|| "Unknown".to_string());
        let id_field = |id: &str| format!("`{}`", id);
        let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| "Unknown".to_string());

        match self {
            Self::CameOnline {
                steam_id,
                name,
                server,
            } => Embed::new("🎮 Player Online", COLOR_ONLINE)
                .field("Player", player(name))
                .field("SteamID", id_field(steam_id))
                .field("Server", server.clone())
                .field("BattleMetrics", rcon_search_url(steam_id)),
            Self::WentOffline {
                steam_id,
                name,
                last_server,
            } => Embed::new("🔴 Player Offline", COLOR_OFFLINE)
                .field("Player", player(name))
                .field("SteamID", id_field(steam_id))
                .field("Last Server", or_unknown(last_server))
                .field("BattleMetrics", rcon_search_url(steam_id)),
            Self::ChangedServer {
                steam_id,
                name,
                from,
                to,
            } => Embed::new("🔄 Player Changed Servers", COLOR_CHANGED)
                .field("Player", player(name))
                .field("SteamID", id_field(steam_id))
                .field("From Server", from.clone())
                .field("To Server", to.clone())
                .field("BattleMetrics", rcon_search_url(steam_id)),
            Self::WatchAdded {
                steam_id,
                name,
                added_by,
            } => Embed::new("📋 Player Watch Added", COLOR_ADDED)
                .field("Player", player(name))
                .field("SteamID", id_field(steam_id))
                .field("Added by", added_by.clone()),
            Self::WatchRemoved {
                steam_id,
                name,
                added_by,
                removed_by,
            } => Embed::new("🗑️ Player Watch Removed", COLOR_REMOVED)
                .field("Player", player(name))
                .field("SteamID", id_field(steam_id))
                .field("Originally Added by", added_by.clone())
                .field("Removed by", removed_by.clone()),
        }
    }
}

/// Notification sink.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, event: &Event) -> Result<(), DispatchError>;
}

/// Deliver one event inside its own error boundary.
///
/// Returns whether delivery succeeded; callers are free to ignore it.
pub async fn dispatch(notifier: &dyn Notifier, event: Event) -> bool {
    match notifier.deliver(&event).await {
        Ok(()) => {
            debug!(event = event.kind(), steam_id = %event.steam_id(), "Notification delivered");
            true
        }
        Err(e) => {
            warn!(
                event = event.kind(),
                steam_id = %event.steam_id(),
                channel = event.channel().label(),
                error = %e,
                "Failed to deliver notification"
            );
            crate::metrics::record_dispatch_failure(event.channel().label(), e.error_code());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingNotifier;

    #[test]
    fn offline_embed_uses_last_server() {
        let embed = Event::WentOffline {
            steam_id: "765".into(),
            name: None,
            last_server: Some("Alpha".into()),
        }
        .to_embed();
        assert_eq!(embed.field_value("Player"), Some("Unknown"));
        assert_eq!(embed.field_value("SteamID"), Some("`765`"));
        assert_eq!(embed.field_value("Last Server"), Some("Alpha"));
        assert!(embed
            .field_value("BattleMetrics")
            .is_some_and(|v| v.ends_with("filter[search]=765")));
    }

    #[test]
    fn removed_embed_carries_both_users() {
        let embed = Event::WatchRemoved {
            steam_id: "765".into(),
            name: Some("Rusty".into()),
            added_by: "alice".into(),
            removed_by: "bob".into(),
        }
        .to_embed();
        assert_eq!(embed.field_value("Originally Added by"), Some("alice"));
        assert_eq!(embed.field_value("Removed by"), Some("bob"));
    }

    #[test]
    fn channels_split_alerts_from_audit() {
        let online = Event::CameOnline {
            steam_id: "1".into(),
            name: None,
            server: "A".into(),
        };
        let added = Event::WatchAdded {
            steam_id: "1".into(),
            name: None,
            added_by: "a".into(),
        };
        assert_eq!(online.channel(), Channel::PlayerAlert);
        assert_eq!(added.channel(), Channel::Logging);
    }

    #[tokio::test]
    async fn dispatch_swallows_failures() {
        let notifier = RecordingNotifier::failing();
        let ok = dispatch(
            &notifier,
            Event::CameOnline {
                steam_id: "1".into(),
                name: None,
                server: "A".into(),
            },
        )
        .await;
        assert!(!ok);
        assert_eq!(notifier.events().len(), 1);
    }
}
