//! Telemetry utilities for command timing and span construction.

use std::time::Instant;

/// Guard for timing command execution and recording metrics.
///
/// Records command latency when dropped.
pub struct CommandTimer {
    command: &'static str,
    start: Instant,
}

impl CommandTimer {
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_command(self.command, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for one reconciliation pass.
    pub fn pass(entries: usize) -> Span {
        info_span!("pass", entries = entries)
    }

    /// Span for reconciling a single watched player.
    pub fn entry(steam_id: &str) -> Span {
        info_span!("entry", steam_id = %steam_id)
    }

    /// Span for a command invocation.
    pub fn command(name: &str, user: &str, steam_id: Option<&str>) -> Span {
        if let Some(steam_id) = steam_id {
            info_span!("command", name = %name, user = %user, steam_id = %steam_id)
        } else {
            info_span!("command", name = %name, user = %user)
        }
    }
}
