//! JSON:API documents returned by BattleMetrics and the presence snapshot
//! derived from them.

use super::UNKNOWN_SERVER;
use serde::Deserialize;

/// A JSON:API resource object. Only the fields we read are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub attributes: Option<Attributes>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attributes {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    pub online: Option<bool>,
}

impl Resource {
    fn name(&self) -> Option<&str> {
        self.attributes.as_ref()?.name.as_deref()
    }

    fn is_online_server(&self) -> bool {
        self.kind == "server" && self.meta.as_ref().and_then(|m| m.online) == Some(true)
    }
}

/// Response of `GET /players?filter[search]=...`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchDocument {
    #[serde(default)]
    pub data: Vec<Resource>,
}

impl SearchDocument {
    /// Handle of the first match, if any.
    pub fn first_handle(&self) -> Option<&str> {
        self.data.first().map(|r| r.id.as_str())
    }
}

/// Response of `GET /players/{id}?include=server`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerDocument {
    pub data: Resource,
    #[serde(default)]
    pub included: Vec<Resource>,
}

/// Presence snapshot for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStatus {
    pub is_online: bool,
    /// Name of the server the player is on; `None` when offline.
    pub server_label: Option<String>,
    pub display_name: Option<String>,
}

impl PlayerStatus {
    /// Online snapshot on the given server.
    pub fn online(server: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            is_online: true,
            server_label: Some(server.into()),
            display_name: name.map(str::to_string),
        }
    }

    /// Offline snapshot.
    pub fn offline(name: Option<&str>) -> Self {
        Self {
            is_online: false,
            server_label: None,
            display_name: name.map(str::to_string),
        }
    }

    /// Derive presence from a player document.
    ///
    /// The player is online iff an included `server` record carries
    /// `meta.online == true`; the first such record wins.
    pub fn from_document(doc: &PlayerDocument) -> Self {
        let display_name = doc.data.name();
        match doc.included.iter().find(|r| r.is_online_server()) {
            Some(server) => Self::online(
                server.name().unwrap_or(UNKNOWN_SERVER),
                display_name,
            ),
            None => Self::offline(display_name),
        }
    }
}
