//! Discord webhook delivery.

use super::{Channel, Event, Notifier};
use crate::config::WebhookConfig;
use crate::error::DispatchError;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Timeout for a single webhook POST.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts events as embeds to the configured webhooks.
pub struct WebhookNotifier {
    http: reqwest::Client,
    player_alert: Option<String>,
    logging: Option<String>,
}

impl WebhookNotifier {
    pub fn new(config: &WebhookConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .user_agent(concat!("bmwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            player_alert: config.player_alert.clone(),
            logging: config.logging.clone(),
        }
    }

    fn target(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::PlayerAlert => self.player_alert.as_deref(),
            Channel::Logging => self.logging.as_deref(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn deliver(&self, event: &Event) -> Result<(), DispatchError> {
        let channel = event.channel();
        let Some(url) = self.target(channel) else {
            debug!(event = event.kind(), channel = channel.label(), "Webhook not configured, dropping event");
            return Ok(());
        };

        let payload = json!({ "embeds": [event.to_embed()] });
        let response = self.http.post(url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_channel_is_a_silent_success() {
        let notifier = WebhookNotifier::new(&WebhookConfig::default());
        let result = notifier
            .deliver(&Event::WatchAdded {
                steam_id: "765".into(),
                name: None,
                added_by: "alice".into(),
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unreachable_webhook_is_an_error() {
        let notifier = WebhookNotifier::new(&WebhookConfig {
            player_alert: Some("http://127.0.0.1:1/hook".into()),
            logging: None,
        });
        let result = notifier
            .deliver(&Event::CameOnline {
                steam_id: "765".into(),
                name: None,
                server: "Alpha".into(),
            })
            .await;
        assert!(matches!(result, Err(DispatchError::Http(_))));
    }
}
