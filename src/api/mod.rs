//! BattleMetrics API access.
//!
//! Two calls cover everything the daemon needs:
//! - player search by SteamID (authenticated) for identity resolution
//! - player lookup with `include=server` (public) for presence
//!
//! Both sit behind [`PlayerApi`] so the reconciliation engine and command
//! handlers can run against an in-memory fake.

pub mod battlemetrics;
pub mod types;

pub use battlemetrics::BattleMetricsClient;
pub use types::{PlayerDocument, PlayerStatus, SearchDocument};

use crate::error::ApiError;
use async_trait::async_trait;

/// Sentinel label used when an online server carries no name.
pub const UNKNOWN_SERVER: &str = "Unknown";

/// Presence data source.
#[async_trait]
pub trait PlayerApi: Send + Sync {
    /// Resolve an external player identifier to the data source's handle.
    ///
    /// Returns [`ApiError::NotFound`] when the search yields no match. When
    /// several players match, the first one wins.
    async fn search_player(&self, external_id: &str) -> Result<String, ApiError>;

    /// Fetch the current presence snapshot for a resolved handle.
    async fn fetch_status(&self, handle: &str) -> Result<PlayerStatus, ApiError>;
}

/// Link to the BattleMetrics RCON player search for an identifier.
pub fn rcon_search_url(external_id: &str) -> String {
    format!(
        "https://www.battlemetrics.com/rcon/players?filter[search]={}",
        external_id
    )
}
