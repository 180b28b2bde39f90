use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Audio variant of a server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Original audio with subtitles
    Sub,
    /// Dubbed audio
    Dub,
}

impl Variant {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sub => "sub",
            Self::Dub => "dub",
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sub" => Ok(Self::Sub),
            "dub" => Ok(Self::Dub),
            _ => Err(format!("Unknown variant: {s}")),
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server the caller wants a stream from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSelection {
    /// Server name as listed by the site (e.g. "HD-1", "HD-4")
    pub name: String,
    #[serde(rename = "type")]
    pub variant: Variant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    /// Upstream server id, needed by adapters that address servers by id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ServerSelection {
    #[must_use]
    pub fn new(name: impl Into<String>, variant: Variant) -> Self {
        Self {
            name: name.into(),
            variant,
            index: None,
            id: None,
        }
    }

    #[must_use]
    pub const fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// One server in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ServerEntry {
    /// Entry id, if present and non-empty
    #[must_use]
    pub fn valid_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Selection addressing this entry in the given variant
    #[must_use]
    pub fn to_selection(&self, variant: Variant) -> ServerSelection {
        ServerSelection {
            name: self.name.clone(),
            variant,
            index: self.index,
            id: self.id.clone(),
        }
    }
}

/// Servers available for an episode, grouped by variant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerListing {
    #[serde(default)]
    pub sub: Vec<ServerEntry>,
    #[serde(default)]
    pub dub: Vec<ServerEntry>,
}

impl ServerListing {
    #[must_use]
    pub fn servers(&self, variant: Variant) -> &[ServerEntry] {
        match variant {
            Variant::Sub => &self.sub,
            Variant::Dub => &self.dub,
        }
    }
}

/// Episode id carried by a composite episode reference.
///
/// Everything after the last `ep=`; the whole reference when the marker is absent.
#[must_use]
pub fn episode_id_from_ref(episode_ref: &str) -> &str {
    episode_ref
        .rsplit_once("ep=")
        .map_or(episode_ref, |(_, id)| id)
}
