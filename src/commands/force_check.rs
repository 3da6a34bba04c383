//! FORCE_CHECK command handler.

use super::{Reply, WatchService};
use crate::error::{CommandError, CommandResult};
use crate::notify::Embed;
use crate::notify::embed::COLOR_INFO;
use tracing::info;

/// Handle FORCE_CHECK command: run a full pass now.
pub async fn handle_force_check(service: &WatchService, user: &str) -> CommandResult<Reply> {
    if service.store.is_empty().await {
        return Ok(Reply::ephemeral(
            "📭 Watchlist is empty. Add some players first!",
        ));
    }

    info!(user = %user, "Force check triggered");
    // Detached so a dropped request cannot cancel the pass mid-dispatch.
    let reconciler = service.reconciler.clone();
    let report = tokio::spawn(async move { reconciler.run_pass().await })
        .await
        .map_err(|e| CommandError::Internal(format!("force check pass failed: {}", e)))?;

    let embed = Embed::new("🔄 Force Check Complete", COLOR_INFO)
        .description(format!(
            "✅ Checked {} monitored players for online status.",
            report.processed
        ))
        .inline_field("Triggered by", user)
        .inline_field("Players checked", report.processed.to_string());
    Ok(Reply::with_embed(embed, true))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{fixture, fixture_with, invoke};
    use crate::api::PlayerStatus;
    use crate::testing::RecordingNotifier;
    use std::time::Duration;

    #[tokio::test]
    async fn empty_watchlist_makes_no_api_calls() {
        let fx = fixture().await;
        let reply = fx.service.handle(invoke("force_check", "alice", None)).await;

        assert!(reply.ephemeral);
        assert_eq!(
            reply.content.as_deref(),
            Some("📭 Watchlist is empty. Add some players first!")
        );
        assert_eq!(fx.api.search_calls(), 0);
        assert_eq!(fx.api.status_calls(), 0);
    }

    #[tokio::test]
    async fn force_check_runs_a_pass() {
        let fx = fixture().await;
        fx.api.add_player("1", "bm-1");
        fx.api.set_status("bm-1", PlayerStatus::online("Alpha", None));
        fx.store.add("1", "alice").await;
        fx.store.add("2", "alice").await;

        let reply = fx.service.handle(invoke("force_check", "bob", None)).await;
        let embed = reply.embed.unwrap();
        assert_eq!(
            embed.description.as_deref(),
            Some("✅ Checked 2 monitored players for online status.")
        );
        assert_eq!(embed.field_value("Triggered by"), Some("bob"));
        assert!(fx.store.get("1").await.unwrap().is_online());
        assert_eq!(fx.notifier.events().len(), 1);
    }

    #[tokio::test]
    async fn dropped_request_does_not_lose_alert() {
        let fx = fixture_with(RecordingNotifier::slow(Duration::from_millis(200))).await;
        fx.api.add_player("1", "bm-1");
        fx.api.set_status("bm-1", PlayerStatus::online("Alpha", None));
        fx.store.add("1", "alice").await;

        let request = fx.service.handle(invoke("force_check", "bob", None));
        let timed_out = tokio::time::timeout(Duration::from_millis(50), request)
            .await
            .is_err();
        assert!(timed_out);

        // The pass keeps running after the caller went away
        let events = fx.notifier.wait_for(1).await;
        assert_eq!(events.len(), 1);
        assert!(fx.store.get("1").await.unwrap().is_online());
    }
}
