//! Unified error handling for bmwatch.
//!
//! Every error here is caught at the smallest scope that can recover from it
//! (a single watch entry, a single webhook, a single command). Each exposes a
//! static code for metrics labeling.

use thiserror::Error;

// ============================================================================
// API Errors (identity resolution + status fetch)
// ============================================================================

/// Errors from the BattleMetrics API.
///
/// `NotFound` is the identity-resolution miss; every other variant is a
/// fetch failure for the current cycle.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("player not found")]
    NotFound,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Http(_) => "http",
            Self::Timeout => "timeout",
            Self::Status(_) => "status",
            Self::Decode(_) => "decode",
        }
    }

    /// Whether this is a soft miss rather than a transport/payload failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Classify a reqwest error, separating timeouts.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

// ============================================================================
// Store Errors (watchlist persistence)
// ============================================================================

/// Durable-write and load failures for the watchlist document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("watchlist io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("watchlist serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Serialize(_) => "serialize",
        }
    }
}

// ============================================================================
// Dispatch Errors (webhook delivery)
// ============================================================================

/// Notification delivery failures. Logged, never retried.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook rejected with status {0}")]
    Status(u16),
}

impl DispatchError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Status(_) => "status",
        }
    }
}

// ============================================================================
// Command Errors (handler boundary)
// ============================================================================

/// Errors raised inside command handlers.
///
/// The handler boundary converts these into a reply; none escape to the
/// transport.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("missing required option: {0}")]
    MissingArgument(&'static str),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("api error: {0}")]
    Api(#[from] ApiError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CommandError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingArgument(_) => "missing_argument",
            Self::UnknownCommand(_) => "unknown_command",
            Self::Api(_) => "api_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// User-facing reply text for this error.
    pub fn reply_text(&self) -> String {
        match self {
            Self::MissingArgument(name) => format!("❌ Missing required option `{}`.", name),
            Self::UnknownCommand(cmd) => format!("❌ Unknown command `{}`.", cmd),
            Self::Api(_) | Self::Internal(_) => {
                "❌ An error occurred while processing your command.".to_string()
            }
        }
    }
}

/// Result type for command handlers.
pub type CommandResult<T> = Result<T, CommandError>;
