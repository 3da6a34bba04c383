//! Slash-command registration with Discord.

use super::Command;
use crate::config::DiscordConfig;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Discord option type for strings.
const OPTION_STRING: u8 = 3;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("discord.token and discord.application_id are required")]
    MissingCredentials,

    #[error("invalid bot token, check discord.token or BOT_TOKEN")]
    Unauthorized,

    #[error("bot lacks permission to register commands")]
    Forbidden,

    #[error("invalid application ID, check discord.application_id or DISCORD_CLIENT_ID")]
    UnknownApplication,

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
}

impl RegistrationError {
    fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::UnknownApplication,
            other => Self::Status(other),
        }
    }
}

/// Command definitions in Discord's application-command format.
pub fn definitions() -> Vec<Value> {
    Command::ALL
        .into_iter()
        .map(|command| {
            let mut def = json!({
                "name": command.name(),
                "description": command.description(),
                "type": 1,
            });
            if command.takes_steam_id() {
                def["options"] = json!([{
                    "type": OPTION_STRING,
                    "name": super::STEAM_ID,
                    "description": "The SteamID64 of the player",
                    "required": true,
                }]);
            }
            def
        })
        .collect()
}

/// Register all commands globally, and for the guild when one is configured.
///
/// Returns the number of commands registered.
pub async fn register_commands(config: &DiscordConfig) -> Result<usize, RegistrationError> {
    let (Some(token), Some(app_id)) = (config.token.as_deref(), config.application_id.as_deref())
    else {
        return Err(RegistrationError::MissingCredentials);
    };

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("bmwatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    let base = config.api_url.trim_end_matches('/');
    let body = definitions();

    info!(application_id = %app_id, "Registering application commands");
    put_commands(&http, &format!("{}/applications/{}/commands", base, app_id), token, &body)
        .await?;

    if let Some(guild_id) = config.guild_id.as_deref() {
        info!(guild_id = %guild_id, "Registering guild commands");
        let url = format!(
            "{}/applications/{}/guilds/{}/commands",
            base, app_id, guild_id
        );
        put_commands(&http, &url, token, &body).await?;
    }

    info!(count = body.len(), "Commands registered");
    Ok(body.len())
}

async fn put_commands(
    http: &reqwest::Client,
    url: &str,
    token: &str,
    body: &[Value],
) -> Result<(), RegistrationError> {
    let response = http
        .put(url)
        .header("Authorization", format!("Bot {}", token))
        .json(body)
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(RegistrationError::from_status(status.as_u16()));
    }
    Ok(())
}
