//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions, TOML loading and environment overrides
//! - [`validation`]: Startup validation that reports every problem at once

mod types;
pub mod validation;

pub use types::{ApiConfig, Config, DiscordConfig, WebhookConfig};
