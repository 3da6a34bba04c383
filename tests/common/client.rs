//! Command endpoint client.

use serde_json::{Value, json};

/// Sends invocations to a running daemon's `/commands` endpoint.
pub struct CommandClient {
    http: reqwest::Client,
    base_url: String,
}

impl CommandClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Invoke `command` as `user`, returning the JSON reply.
    pub async fn invoke(
        &self,
        command: &str,
        user: &str,
        steam_id: Option<&str>,
    ) -> anyhow::Result<Value> {
        let mut body = json!({ "command": command, "user": user, "options": {} });
        if let Some(id) = steam_id {
            body["options"]["steam_id"] = json!(id);
        }
        self.send(body).await
    }

    /// Post a raw invocation body, returning the JSON reply.
    pub async fn send(&self, body: Value) -> anyhow::Result<Value> {
        let reply = self
            .http
            .post(format!("{}/commands", self.base_url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(reply)
    }

    pub async fn get_text(&self, path: &str) -> anyhow::Result<String> {
        let text = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }
}
