//! Fake BattleMetrics API and Discord webhook sink.
//!
//! One axum server plays both roles so a spawned daemon can be pointed at a
//! single base URL.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Default)]
struct Players {
    /// steam id -> handle
    handles: HashMap<String, String>,
    /// handle -> display name
    names: HashMap<String, String>,
    /// handle -> server the player is on
    online: HashMap<String, String>,
}

#[derive(Default)]
struct MockState {
    players: Mutex<Players>,
    /// (channel, payload) in arrival order
    webhooks: Mutex<Vec<(String, Value)>>,
}

/// A running mock upstream.
pub struct MockUpstream {
    addr: SocketAddr,
    state: Arc<MockState>,
    task: JoinHandle<()>,
}

impl MockUpstream {
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/players", get(search))
            .route("/players/:id", get(player))
            .route("/hooks/:channel", post(webhook))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state, task })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn add_player(&self, steam_id: &str, handle: &str, name: &str) {
        let mut players = self.state.players.lock().unwrap();
        players.handles.insert(steam_id.into(), handle.into());
        players.names.insert(handle.into(), name.into());
    }

    pub fn set_online(&self, handle: &str, server: &str) {
        let mut players = self.state.players.lock().unwrap();
        players.online.insert(handle.into(), server.into());
    }

    pub fn set_offline(&self, handle: &str) {
        self.state.players.lock().unwrap().online.remove(handle);
    }

    pub fn webhooks(&self) -> Vec<(String, Value)> {
        self.state.webhooks.lock().unwrap().clone()
    }

    /// Wait until a webhook with the given embed title arrives.
    pub async fn wait_for_embed(&self, title: &str) -> anyhow::Result<Value> {
        for _ in 0..50 {
            let found = self
                .webhooks()
                .into_iter()
                .map(|(_, body)| body["embeds"][0].clone())
                .find(|embed| embed["title"] == title);
            if let Some(embed) = found {
                return Ok(embed);
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("no webhook with title {:?} within 5 seconds", title)
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn search(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let players = state.players.lock().unwrap();
    let data: Vec<Value> = query
        .get("filter[search]")
        .and_then(|id| players.handles.get(id))
        .map(|handle| json!({ "type": "player", "id": handle }))
        .into_iter()
        .collect();
    Json(json!({ "data": data }))
}

async fn player(
    State(state): State<Arc<MockState>>,
    Path(handle): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let players = state.players.lock().unwrap();
    let Some(name) = players.names.get(&handle) else {
        return Err(StatusCode::NOT_FOUND);
    };

    let included: Vec<Value> = players
        .online
        .get(&handle)
        .map(|server| {
            json!({
                "type": "server",
                "id": "srv-1",
                "attributes": { "name": server },
                "meta": { "online": true }
            })
        })
        .into_iter()
        .collect();

    Ok(Json(json!({
        "data": { "type": "player", "id": handle, "attributes": { "name": name } },
        "included": included
    })))
}

async fn webhook(
    State(state): State<Arc<MockState>>,
    Path(channel): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    state.webhooks.lock().unwrap().push((channel, body));
    StatusCode::NO_CONTENT
}
