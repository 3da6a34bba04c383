//! In-memory fakes for unit tests.

use crate::api::{PlayerApi, PlayerStatus};
use crate::error::{ApiError, DispatchError};
use crate::notify::{Event, Notifier};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scriptable stats API.
#[derive(Default)]
pub struct FakeApi {
    players: DashMap<String, String>,
    statuses: DashMap<String, PlayerStatus>,
    failing: DashSet<String>,
    search_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `external_id` resolvable to `handle` (offline until a status is set).
    pub fn add_player(&self, external_id: &str, handle: &str) {
        self.players
            .insert(external_id.to_string(), handle.to_string());
    }

    pub fn set_status(&self, handle: &str, status: PlayerStatus) {
        self.failing.remove(handle);
        self.statuses.insert(handle.to_string(), status);
    }

    /// Make status fetches for `handle` fail.
    pub fn fail_status(&self, handle: &str) {
        self.failing.insert(handle.to_string());
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlayerApi for FakeApi {
    async fn search_player(&self, external_id: &str) -> Result<String, ApiError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.players
            .get(external_id)
            .map(|h| h.clone())
            .ok_or(ApiError::NotFound)
    }

    async fn fetch_status(&self, handle: &str) -> Result<PlayerStatus, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(handle) {
            return Err(ApiError::Status(500));
        }
        Ok(self
            .statuses
            .get(handle)
            .map(|s| s.clone())
            .unwrap_or_default())
    }
}

/// Notifier that records every event it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Event>>,
    fail: bool,
    delay: Option<Duration>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records events but reports every delivery as failed.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Takes `delay` to deliver each event, recording it afterwards.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Poll until at least `count` events arrived (background tasks).
    pub async fn wait_for(&self, count: usize) -> Vec<Event> {
        for _ in 0..100 {
            let events = self.events();
            if events.len() >= count {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.events()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, event: &Event) -> Result<(), DispatchError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.events.lock().unwrap().push(event.clone());
        if self.fail {
            Err(DispatchError::Status(500))
        } else {
            Ok(())
        }
    }
}
