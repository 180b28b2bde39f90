use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Skip window reported by the provider (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
}

/// `GET /stream/getSources` response
///
/// Every field is kept untyped. The provider has shipped both an object and an
/// array for `sources`, and the optional fields must not fail the response
/// when `sources.file` is usable; the accessors convert them leniently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesResponse {
    #[serde(default)]
    pub sources: Option<Value>,
    #[serde(default)]
    pub tracks: Option<Value>,
    #[serde(default)]
    pub intro: Option<Value>,
    #[serde(default)]
    pub outro: Option<Value>,
}

impl SourcesResponse {
    /// Direct media URL, if the response carries a non-empty `sources.file`
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        self.sources
            .as_ref()
            .and_then(|s| s.get("file"))
            .and_then(Value::as_str)
            .filter(|f| !f.is_empty())
    }

    /// Track entries; anything other than an array counts as no tracks
    #[must_use]
    pub fn track_values(&self) -> &[Value] {
        match &self.tracks {
            Some(Value::Array(tracks)) => tracks,
            Some(Value::Null) | None => &[],
            Some(other) => {
                debug!("Ignoring malformed tracks: {}", other);
                &[]
            }
        }
    }

    #[must_use]
    pub fn intro(&self) -> Option<Segment> {
        lenient("intro", self.intro.as_ref())
    }

    #[must_use]
    pub fn outro(&self) -> Option<Segment> {
        lenient("outro", self.outro.as_ref())
    }
}

fn lenient<T: DeserializeOwned>(field: &str, value: Option<&Value>) -> Option<T> {
    let value = value.filter(|v| !v.is_null())?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!("Ignoring malformed {}: {}", field, e);
            None
        }
    }
}
