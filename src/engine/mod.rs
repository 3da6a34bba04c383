//! Reconciliation engine.
//!
//! For each watched player: resolve the handle, fetch presence, classify the
//! transition against the stored state, mutate the entry and notify. Entries
//! are processed one at a time in watchlist order, and a failure on one entry
//! never stops the pass.

mod transition;

pub use transition::{Transition, apply, classify};

use crate::api::PlayerApi;
use crate::error::ApiError;
use crate::notify::{self, Event, Notifier};
use crate::resolver::IdentityResolver;
use crate::store::WatchlistStore;
use crate::telemetry::spans;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, debug, info, warn};

/// Why an entry was skipped this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Search returned no player.
    NotFound,
    /// Search failed.
    ResolveFailed,
    /// Presence fetch failed.
    FetchFailed,
}

/// Result of reconciling a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// A transition fired and a notification was dispatched.
    Notified(Transition),
    /// Steady state; no notification.
    Unchanged,
    Skipped(SkipReason),
    /// The entry was removed while being processed.
    Vanished,
}

/// Summary of one full pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub processed: usize,
    pub events: usize,
    pub skipped: usize,
}

/// Drives reconciliation over the watchlist.
pub struct Reconciler {
    store: Arc<WatchlistStore>,
    resolver: Arc<IdentityResolver>,
    api: Arc<dyn PlayerApi>,
    notifier: Arc<dyn Notifier>,
    /// Serializes passes (timer tick vs. force_check).
    pass_lock: Mutex<()>,
}

impl Reconciler {
    pub fn new(
        store: Arc<WatchlistStore>,
        resolver: Arc<IdentityResolver>,
        api: Arc<dyn PlayerApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            resolver,
            api,
            notifier,
            pass_lock: Mutex::new(()),
        }
    }

    /// Run one full pass over the watchlist.
    pub async fn run_pass(&self) -> PassReport {
        let _guard = self.pass_lock.lock().await;
        let start = Instant::now();
        let ids = self.store.keys().await;
        let mut report = PassReport::default();

        async {
            info!(count = ids.len(), "Running player check");
            for id in &ids {
                match self.reconcile_entry(id).await {
                    EntryOutcome::Notified(_) => report.events += 1,
                    EntryOutcome::Unchanged => {}
                    EntryOutcome::Skipped(_) => report.skipped += 1,
                    EntryOutcome::Vanished => continue,
                }
                report.processed += 1;
            }
        }
        .instrument(spans::pass(ids.len()))
        .await;

        let elapsed = start.elapsed();
        crate::metrics::record_pass(elapsed.as_secs_f64());
        info!(
            processed = report.processed,
            events = report.events,
            skipped = report.skipped,
            elapsed_ms = elapsed.as_millis() as u64,
            "Player check complete"
        );
        report
    }

    /// Reconcile a single watched player.
    pub async fn reconcile_entry(&self, steam_id: &str) -> EntryOutcome {
        self.reconcile_inner(steam_id)
            .instrument(spans::entry(steam_id))
            .await
    }

    async fn reconcile_inner(&self, steam_id: &str) -> EntryOutcome {
        let Some(entry) = self.store.get(steam_id).await else {
            return EntryOutcome::Vanished;
        };

        let resolved = match self
            .resolver
            .resolve(steam_id, entry.internal_handle())
            .await
        {
            Ok(resolved) => resolved,
            Err(ApiError::NotFound) => {
                info!("No player found for SteamID");
                return EntryOutcome::Skipped(SkipReason::NotFound);
            }
            Err(e) => {
                warn!(error = %e, "Failed to resolve player");
                crate::metrics::record_api_error("search", e.error_code());
                return EntryOutcome::Skipped(SkipReason::ResolveFailed);
            }
        };

        if resolved.newly_resolved {
            let handle = resolved.handle.as_str();
            let cached = self
                .store
                .update_with(steam_id, |e| ((), e.cache_handle(handle)))
                .await;
            if cached.is_none() {
                return EntryOutcome::Vanished;
            }
            info!(bm_id = %handle, "Cached BattleMetrics ID");
        }

        let status = match self.api.fetch_status(&resolved.handle).await {
            Ok(status) => status,
            Err(e) => {
                warn!(bm_id = %resolved.handle, error = %e, "Failed to fetch player status");
                crate::metrics::record_api_error("status", e.error_code());
                return EntryOutcome::Skipped(SkipReason::FetchFailed);
            }
        };

        // Classify against the entry as it is now, not the copy read above.
        let applied = self
            .store
            .update_with(steam_id, |entry| {
                let mut changed = false;
                if let Some(name) = status.display_name.as_deref() {
                    changed |= entry.cache_display_name(name);
                }
                let transition = classify(entry.is_online(), entry.server_label(), &status);
                changed |= apply(entry, &transition, &status);
                let name = entry.display_name().map(str::to_string);
                ((transition, name), changed)
            })
            .await;
        let Some((transition, name)) = applied else {
            debug!("Entry removed during check, dropping result");
            return EntryOutcome::Vanished;
        };

        debug!(
            online = status.is_online,
            server = ?status.server_label,
            outcome = transition.kind(),
            "Checked player"
        );

        let steam_id = steam_id.to_string();
        let event = match &transition {
            Transition::NoOp => return EntryOutcome::Unchanged,
            Transition::CameOnline { server } => {
                info!(player = ?name, server = %server, "Player came online");
                Event::CameOnline {
                    steam_id,
                    name,
                    server: server.clone(),
                }
            }
            Transition::WentOffline { last_server } => {
                info!(player = ?name, last_server = ?last_server, "Player went offline");
                Event::WentOffline {
                    steam_id,
                    name,
                    last_server: last_server.clone(),
                }
            }
            Transition::ChangedServer { from, to } => {
                info!(player = ?name, from = %from, to = %to, "Player changed servers");
                Event::ChangedServer {
                    steam_id,
                    name,
                    from: from.clone(),
                    to: to.clone(),
                }
            }
        };

        crate::metrics::record_transition(transition.kind());
        notify::dispatch(self.notifier.as_ref(), event).await;
        EntryOutcome::Notified(transition)
    }

    /// Spawn the periodic poll task.
    ///
    /// The first pass runs one interval after startup. Ticks missed while a
    /// pass is running are skipped, and nothing runs while the watchlist is
    /// empty.
    pub fn spawn_poll_task(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + every;
            let mut interval = tokio::time::interval_at(start, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                if self.store.is_empty().await {
                    debug!("Watchlist empty, skipping check");
                    continue;
                }
                self.run_pass().await;
            }
        })
    }
}
