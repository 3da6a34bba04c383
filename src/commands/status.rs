//! STATUS command handler.
//!
//! One-shot lookup that ignores the stored online state.

use super::{Reply, WatchService, lookup_player};
use crate::api::rcon_search_url;
use crate::error::{ApiError, CommandResult};
use crate::notify::Embed;
use crate::notify::embed::{COLOR_STATUS_OFFLINE, COLOR_STATUS_ONLINE};
use tracing::debug;

/// Handle STATUS command.
pub async fn handle_status(service: &WatchService, steam_id: &str) -> CommandResult<Reply> {
    let status = match lookup_player(&service.resolver, service.api.as_ref(), steam_id, None).await
    {
        Ok((_, status)) => status,
        Err(ApiError::NotFound) => {
            debug!(steam_id = %steam_id, "Status lookup found no player");
            return Ok(Reply::ephemeral("❌ Player not found."));
        }
        Err(e) => return Err(e.into()),
    };

    let (online, server, color) = if status.is_online {
        (
            "✅ Yes",
            status.server_label.as_deref().unwrap_or("Unknown"),
            COLOR_STATUS_ONLINE,
        )
    } else {
        ("❌ No", "N/A", COLOR_STATUS_OFFLINE)
    };

    let embed = Embed::new("🔍 Player Status", color)
        .inline_field("Player", status.display_name.as_deref().unwrap_or("Unknown"))
        .inline_field("SteamID", format!("`{}`", steam_id))
        .inline_field("Online?", online)
        .inline_field("Server", server)
        .field("BattleMetrics", rcon_search_url(steam_id));

    Ok(Reply::with_embed(embed, false))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{fixture, invoke};
    use super::*;
    use crate::api::PlayerStatus;

    #[tokio::test]
    async fn online_player() {
        let fx = fixture().await;
        fx.api.add_player("765", "bm-1");
        fx.api
            .set_status("bm-1", PlayerStatus::online("Alpha", Some("Rusty")));

        let reply = fx.service.handle(invoke("status", "alice", Some("765"))).await;
        assert!(!reply.ephemeral);
        let embed = reply.embed.unwrap();
        assert_eq!(embed.color, COLOR_STATUS_ONLINE);
        assert_eq!(embed.field_value("Player"), Some("Rusty"));
        assert_eq!(embed.field_value("Online?"), Some("✅ Yes"));
        assert_eq!(embed.field_value("Server"), Some("Alpha"));
    }

    #[tokio::test]
    async fn offline_player_shows_na() {
        let fx = fixture().await;
        fx.api.add_player("765", "bm-1");

        let reply = fx.service.handle(invoke("status", "alice", Some("765"))).await;
        let embed = reply.embed.unwrap();
        assert_eq!(embed.color, COLOR_STATUS_OFFLINE);
        assert_eq!(embed.field_value("Player"), Some("Unknown"));
        assert_eq!(embed.field_value("Online?"), Some("❌ No"));
        assert_eq!(embed.field_value("Server"), Some("N/A"));
    }

    #[tokio::test]
    async fn unknown_player() {
        let fx = fixture().await;
        let reply = fx.service.handle(invoke("status", "alice", Some("765"))).await;
        assert!(reply.ephemeral);
        assert_eq!(reply.content.as_deref(), Some("❌ Player not found."));
    }

    #[tokio::test]
    async fn status_leaves_store_untouched() {
        let fx = fixture().await;
        fx.api.add_player("765", "bm-1");
        fx.api.set_status("bm-1", PlayerStatus::online("Alpha", None));
        fx.store.add("765", "alice").await;

        fx.service.handle(invoke("status", "alice", Some("765"))).await;
        let entry = fx.store.get("765").await.unwrap();
        assert!(!entry.is_online());
        assert!(fx.notifier.events().is_empty());
    }
}
