//! Discord embed payloads, shared by webhook alerts and command replies.

use serde::Serialize;

pub const COLOR_ONLINE: u32 = 0x2E8B57;
pub const COLOR_OFFLINE: u32 = 0xDC143C;
pub const COLOR_CHANGED: u32 = 0xFFA500;
pub const COLOR_ADDED: u32 = 0xFFA500;
pub const COLOR_REMOVED: u32 = 0xFF5555;
pub const COLOR_INFO: u32 = 0x3498DB;
pub const COLOR_STATUS_ONLINE: u32 = 0x00CC66;
pub const COLOR_STATUS_OFFLINE: u32 = 0xCC0000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    /// RFC 3339 timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Embed {
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            color,
            description: None,
            fields: Vec::new(),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline: false,
        });
        self
    }

    pub fn inline_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline: true,
        });
        self
    }

    /// Value of the first field called `name`.
    #[cfg(test)]
    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}
