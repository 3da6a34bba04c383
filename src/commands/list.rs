//! LIST command handler.

use super::Reply;
use crate::error::CommandResult;
use crate::notify::Embed;
use crate::notify::embed::COLOR_INFO;
use crate::store::WatchlistStore;

/// Handle LIST command.
pub async fn handle_list(store: &WatchlistStore) -> CommandResult<Reply> {
    let entries = store.list_all().await;
    if entries.is_empty() {
        return Ok(Reply::ephemeral("📭 Watchlist is empty."));
    }

    let lines: Vec<String> = entries
        .iter()
        .map(|(steam_id, entry)| {
            format!(
                "• **{}** (`{}`) — added by **{}**",
                entry.name_or_unknown(),
                steam_id,
                entry.added_by_or_unknown()
            )
        })
        .collect();

    let embed = Embed::new("🔍 Current Watchlist", COLOR_INFO).description(lines.join("\n"));
    Ok(Reply::with_embed(embed, true))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{fixture, invoke};

    #[tokio::test]
    async fn empty_list() {
        let fx = fixture().await;
        let reply = fx.service.handle(invoke("list", "alice", None)).await;
        assert!(reply.ephemeral);
        assert_eq!(reply.content.as_deref(), Some("📭 Watchlist is empty."));
    }

    #[tokio::test]
    async fn list_in_insertion_order() {
        let fx = fixture().await;
        fx.store.add("2", "bob").await;
        fx.store.add("1", "alice").await;
        fx.store.update("1", |e| e.cache_display_name("Rusty")).await;

        let reply = fx.service.handle(invoke("list", "carol", None)).await;
        let embed = reply.embed.unwrap();
        assert_eq!(
            embed.description.as_deref(),
            Some(
                "• **Unknown** (`2`) — added by **bob**\n\
                 • **Rusty** (`1`) — added by **alice**"
            )
        );
        assert_eq!(fx.api.search_calls(), 0);
    }
}
