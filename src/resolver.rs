//! Identity resolution: SteamID -> BattleMetrics player handle.
//!
//! Handles never change for a given SteamID, so successful lookups are cached
//! until the SteamID leaves the watchlist. The watch entry's own cached handle
//! takes precedence over both the process cache and the network.

use crate::api::PlayerApi;
use crate::error::ApiError;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Upper bound on process-cached handles. Lookups past it still work, they
/// just are not remembered.
pub const MAX_CACHED_HANDLES: usize = 4096;

/// A resolved handle and whether the caller's entry lacked it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub handle: String,
    /// True when the handle did not come from the entry's own cache and
    /// should be written back.
    pub newly_resolved: bool,
}

/// Caching identity resolver.
pub struct IdentityResolver {
    api: Arc<dyn PlayerApi>,
    cache: DashMap<String, String>,
    max_entries: usize,
}

impl IdentityResolver {
    pub fn new(api: Arc<dyn PlayerApi>) -> Self {
        Self {
            api,
            cache: DashMap::new(),
            max_entries: MAX_CACHED_HANDLES,
        }
    }

    /// Resolve an identifier, preferring `cached` (the entry's stored handle).
    ///
    /// Never writes to the watchlist; writing the handle back is the
    /// caller's job.
    pub async fn resolve(
        &self,
        external_id: &str,
        cached: Option<&str>,
    ) -> Result<Resolved, ApiError> {
        if let Some(handle) = cached {
            return Ok(Resolved {
                handle: handle.to_string(),
                newly_resolved: false,
            });
        }

        if let Some(handle) = self.cache.get(external_id) {
            debug!(steam_id = %external_id, "Handle cache hit");
            return Ok(Resolved {
                handle: handle.clone(),
                newly_resolved: true,
            });
        }

        let handle = self.api.search_player(external_id).await?;
        debug!(steam_id = %external_id, bm_id = %handle, "Resolved player handle");
        if self.cache.len() < self.max_entries {
            self.cache.insert(external_id.to_string(), handle.clone());
        } else {
            debug!(steam_id = %external_id, "Handle cache full, not caching");
        }

        Ok(Resolved {
            handle,
            newly_resolved: true,
        })
    }

    /// Drop the cached handle for an identifier that is no longer watched.
    pub fn forget(&self, external_id: &str) {
        if self.cache.remove(external_id).is_some() {
            debug!(steam_id = %external_id, "Evicted cached handle");
        }
    }

    #[cfg(test)]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
