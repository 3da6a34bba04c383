//! REMOVE command handler.

use super::{Reply, WatchService, lookup_player};
use crate::error::CommandResult;
use crate::notify::{self, Event};
use crate::store::{RemoveOutcome, WatchEntry};
use tracing::{Instrument, info, info_span, warn};

/// Handle REMOVE command.
pub async fn handle_remove(
    service: &WatchService,
    user: &str,
    steam_id: &str,
) -> CommandResult<Reply> {
    match service.store.remove(steam_id).await {
        RemoveOutcome::NotFound => Ok(Reply::ephemeral(format!(
            "❌ SteamID `{}` not found",
            steam_id
        ))),
        RemoveOutcome::Removed(prior) => {
            info!(
                steam_id = %steam_id,
                removed_by = %user,
                added_by = %prior.added_by_or_unknown(),
                "Player removed from watchlist"
            );
            spawn_removal_log(service, steam_id, prior, user);
            Ok(Reply::public(format!("✅ Removed `{}`", steam_id)))
        }
    }
}

/// Send the removal audit event, looking up the name first if the entry
/// never cached one. The process-cached handle is dropped afterwards.
fn spawn_removal_log(service: &WatchService, steam_id: &str, prior: WatchEntry, removed_by: &str) {
    let resolver = service.resolver.clone();
    let api = service.api.clone();
    let notifier = service.notifier.clone();
    let steam_id = steam_id.to_string();
    let removed_by = removed_by.to_string();
    let span = info_span!("watch_removed", steam_id = %steam_id);

    tokio::spawn(
        async move {
            let name = match prior.display_name() {
                Some(name) => Some(name.to_string()),
                None => {
                    match lookup_player(&resolver, api.as_ref(), &steam_id, prior.internal_handle())
                        .await
                    {
                        Ok((_, status)) => status.display_name,
                        Err(e) => {
                            warn!(error = %e, "Failed to look up player name");
                            None
                        }
                    }
                }
            };
            resolver.forget(&steam_id);

            notify::dispatch(
                notifier.as_ref(),
                Event::WatchRemoved {
                    steam_id,
                    name,
                    added_by: prior.added_by_or_unknown().to_string(),
                    removed_by,
                },
            )
            .await;
        }
        .instrument(span),
    );
}
