//! WATCH command handler.

use super::{Reply, STEAM_ID, WatchService, lookup_player};
use crate::error::{CommandError, CommandResult};
use crate::notify::{self, Event};
use crate::store::AddOutcome;
use tracing::{Instrument, debug, info, info_span, warn};

/// Handle WATCH command.
pub async fn handle_watch(
    service: &WatchService,
    user: &str,
    steam_id: &str,
) -> CommandResult<Reply> {
    match service.store.add(steam_id, user).await {
        AddOutcome::AlreadyExists => Ok(Reply::ephemeral(format!(
            "⚠️ Already watching `{}`",
            steam_id
        ))),
        AddOutcome::Invalid => Err(CommandError::MissingArgument(STEAM_ID)),
        AddOutcome::Created => {
            info!(steam_id = %steam_id, added_by = %user, "Player added to watchlist");
            spawn_name_resolution(service, steam_id, user);
            Ok(Reply::public(format!("✅ Now watching `{}`", steam_id)))
        }
    }
}

/// Look up the new entry's name in the background, cache it, then send the
/// audit event. Failures only cost the name.
fn spawn_name_resolution(service: &WatchService, steam_id: &str, added_by: &str) {
    let store = service.store.clone();
    let resolver = service.resolver.clone();
    let api = service.api.clone();
    let notifier = service.notifier.clone();
    let steam_id = steam_id.to_string();
    let added_by = added_by.to_string();
    let span = info_span!("watch_added", steam_id = %steam_id);

    tokio::spawn(
        async move {
            let name = match lookup_player(&resolver, api.as_ref(), &steam_id, None).await {
                Ok((resolved, status)) => {
                    let name = status.display_name;
                    let cached = store
                        .update_with(&steam_id, |entry| {
                            let mut changed = entry.cache_handle(&resolved.handle);
                            if let Some(name) = name.as_deref() {
                                changed |= entry.cache_display_name(name);
                            }
                            ((), changed)
                        })
                        .await;
                    if cached.is_none() {
                        debug!("Entry removed before name lookup finished");
                    }
                    name
                }
                Err(e) => {
                    warn!(error = %e, "Failed to look up player name");
                    if !e.is_not_found() {
                        crate::metrics::record_api_error("lookup", e.error_code());
                    }
                    None
                }
            };

            notify::dispatch(
                notifier.as_ref(),
                Event::WatchAdded {
                    steam_id,
                    name,
                    added_by,
                },
            )
            .await;
        }
        .instrument(span),
    );
}
