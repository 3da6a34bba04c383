//! Transition classification.
//!
//! | previous | current | server changed           | outcome       |
//! |----------|---------|--------------------------|---------------|
//! | offline  | online  | -                        | CameOnline    |
//! | online   | offline | -                        | WentOffline   |
//! | online   | online  | yes, previous known      | ChangedServer |
//! | online   | online  | no, or previous unknown  | NoOp (refresh)|
//! | offline  | offline | -                        | NoOp          |

use crate::api::{PlayerStatus, UNKNOWN_SERVER};
use crate::store::WatchEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    CameOnline { server: String },
    WentOffline { last_server: Option<String> },
    ChangedServer { from: String, to: String },
    NoOp,
}

impl Transition {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CameOnline { .. } => "came_online",
            Self::WentOffline { .. } => "went_offline",
            Self::ChangedServer { .. } => "changed_server",
            Self::NoOp => "noop",
        }
    }

    #[cfg(test)]
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// Classify a fresh status against the previous state.
pub fn classify(
    previous_online: bool,
    previous_server: Option<&str>,
    status: &PlayerStatus,
) -> Transition {
    let current_server = status.server_label.as_deref().unwrap_or(UNKNOWN_SERVER);

    match (previous_online, status.is_online) {
        (false, true) => Transition::CameOnline {
            server: current_server.to_string(),
        },
        (true, false) => Transition::WentOffline {
            last_server: previous_server.map(str::to_string),
        },
        (true, true) => match previous_server {
            Some(from) if from != current_server => Transition::ChangedServer {
                from: from.to_string(),
                to: current_server.to_string(),
            },
            _ => Transition::NoOp,
        },
        (false, false) => Transition::NoOp,
    }
}

/// Apply a classified transition to `entry`. Returns true if the entry changed.
pub fn apply(entry: &mut WatchEntry, transition: &Transition, status: &PlayerStatus) -> bool {
    match transition {
        Transition::CameOnline { server } => {
            entry.mark_online(server);
            true
        }
        Transition::WentOffline { .. } => {
            entry.mark_offline();
            true
        }
        Transition::ChangedServer { to, .. } => {
            entry.mark_online(to);
            true
        }
        Transition::NoOp if status.is_online => {
            let current = status.server_label.as_deref().unwrap_or(UNKNOWN_SERVER);
            entry.refresh_server_label(current)
        }
        Transition::NoOp => false,
    }
}
