//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("api.token (BATTLEMETRICS_TOKEN) is required")]
    MissingApiToken,
    #[error("watch.check_interval_ms must be greater than zero")]
    ZeroInterval,
    #[error("{field} must be an http(s) URL, got '{value}'")]
    InvalidUrl { field: &'static str, value: String },
    #[error("watch.watchlist_path parent directory does not exist: {0}")]
    WatchlistPathInvalid(String),
    #[error("discord.token (BOT_TOKEN) is required for command registration")]
    MissingBotToken,
    #[error("discord.application_id (DISCORD_CLIENT_ID) is required for command registration")]
    MissingApplicationId,
}

/// Validate a configuration for running the daemon, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.api.token.as_deref().is_none_or(str::is_empty) {
        errors.push(ValidationError::MissingApiToken);
    }

    if config.watch.check_interval_ms == 0 {
        errors.push(ValidationError::ZeroInterval);
    }

    check_url(&mut errors, "api.base_url", Some(&config.api.base_url));
    check_url(
        &mut errors,
        "api.public_base_url",
        config.api.public_base_url.as_ref(),
    );
    check_url(
        &mut errors,
        "webhooks.player_alert",
        config.webhooks.player_alert.as_ref(),
    );
    check_url(&mut errors, "webhooks.logging", config.webhooks.logging.as_ref());

    let path = Path::new(&config.watch.watchlist_path);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::WatchlistPathInvalid(
            config.watch.watchlist_path.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the settings needed to register slash commands.
pub fn validate_registration(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if config.discord.token.as_deref().is_none_or(str::is_empty) {
        errors.push(ValidationError::MissingBotToken);
    }
    if config
        .discord
        .application_id
        .as_deref()
        .is_none_or(str::is_empty)
    {
        errors.push(ValidationError::MissingApplicationId);
    }
    check_url(&mut errors, "discord.api_url", Some(&config.discord.api_url));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: Option<&String>) {
    if let Some(url) = value
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: url.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.api.token = Some("token".to_string());
        config
    }

    #[test]
    fn default_with_token_is_valid() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = Config::default();
        config.watch.check_interval_ms = 0;
        config.webhooks.player_alert = Some("ftp://nope".to_string());
        config.watch.watchlist_path = "/definitely/not/here/watchlist.json".to_string();

        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingApiToken)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::ZeroInterval)));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::InvalidUrl { field: "webhooks.player_alert", .. }
        )));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::WatchlistPathInvalid(_))));
    }

    #[test]
    fn registration_requires_discord_identity() {
        let errors = validate_registration(&valid_config()).unwrap_err();
        assert_eq!(errors.len(), 2);

        let mut config = valid_config();
        config.discord.token = Some("bot".to_string());
        config.discord.application_id = Some("42".to_string());
        assert!(validate_registration(&config).is_ok());
    }
}
