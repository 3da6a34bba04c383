//! reqwest-backed BattleMetrics client.

use super::{PlayerApi, PlayerDocument, PlayerStatus, SearchDocument};
use crate::config::ApiConfig;
use crate::error::ApiError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// BattleMetrics API client.
///
/// Player search goes to the authenticated base URL with the bearer token;
/// player lookups go to the public base URL without credentials.
pub struct BattleMetricsClient {
    http: reqwest::Client,
    base_url: String,
    public_base_url: String,
    token: Option<String>,
}

impl BattleMetricsClient {
    /// Create a new client from configuration.
    pub fn new(config: &ApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("bmwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            public_base_url: config.public_base_url().trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await.map_err(ApiError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(ApiError::from_transport)?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PlayerApi for BattleMetricsClient {
    async fn search_player(&self, external_id: &str) -> Result<String, ApiError> {
        let mut request = self
            .http
            .get(format!("{}/players", self.base_url))
            .query(&[("filter[search]", external_id)]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let doc: SearchDocument = self.get_json(request).await?;
        if doc.data.len() > 1 {
            debug!(
                steam_id = %external_id,
                candidates = doc.data.len(),
                "Multiple players matched search, using the first"
            );
        }
        doc.first_handle()
            .map(str::to_string)
            .ok_or(ApiError::NotFound)
    }

    async fn fetch_status(&self, handle: &str) -> Result<PlayerStatus, ApiError> {
        let request = self
            .http
            .get(format!("{}/players/{}", self.public_base_url, handle))
            .query(&[("include", "server")]);

        let doc: PlayerDocument = self.get_json(request).await?;
        Ok(PlayerStatus::from_document(&doc))
    }
}
