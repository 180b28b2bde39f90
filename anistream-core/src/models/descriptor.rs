use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::selection::Variant;

/// Text track attached to a stream
///
/// Only `kind` is interpreted; every other field is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Track {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            fields: Map::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_captions(&self) -> bool {
        self.kind.as_deref() == Some("captions")
    }

    /// Captions or subtitles
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self.kind.as_deref(), Some("captions" | "subtitles"))
    }
}

/// Intro/outro window in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl From<anistream_media_providers::megaplay::Segment> for TimeRange {
    fn from(segment: anistream_media_providers::megaplay::Segment) -> Self {
        Self {
            start: segment.start,
            end: segment.end,
        }
    }
}

/// Stream container type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Hls,
}

/// Playable link of a resolved stream
///
/// `file` is always the proxied URL; the direct URL is kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamLink {
    file: String,
    direct_url: String,
    proxy_url: String,
    #[serde(rename = "type")]
    kind: StreamKind,
}

impl StreamLink {
    #[must_use]
    pub fn hls(direct_url: impl Into<String>, proxy_url: impl Into<String>) -> Self {
        let proxy_url = proxy_url.into();
        Self {
            file: proxy_url.clone(),
            direct_url: direct_url.into(),
            proxy_url,
            kind: StreamKind::Hls,
        }
    }

    /// URL the player should load (the proxied URL)
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    #[must_use]
    pub fn direct_url(&self) -> &str {
        &self.direct_url
    }

    #[must_use]
    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }

    #[must_use]
    pub const fn kind(&self) -> StreamKind {
        self.kind
    }
}

/// Result of the dub subtitle backfill, present only when it was attempted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BackfillOutcome {
    /// Sub tracks were appended
    Applied { added: usize },
    /// No sub server matched the dub selection
    NoMatchingServer,
    /// The sub stream carried no captions or subtitles
    NoSubtitles,
    /// Listing or adapter call failed
    Failed { reason: String },
}

/// Normalized, playable stream
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub variant: Variant,
    pub link: StreamLink,
    pub tracks: Vec<Track>,
    pub intro: Option<TimeRange>,
    pub outro: Option<TimeRange>,
    pub server: String,
    pub used_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle_backfill: Option<BackfillOutcome>,
}

impl StreamDescriptor {
    #[must_use]
    pub fn has_captions(&self) -> bool {
        self.tracks.iter().any(Track::is_captions)
    }
}

/// Soft failure: extraction could not produce a playable link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradedDescriptor {
    pub streaming_link: String,
    pub servers: String,
    pub error: String,
}

impl DegradedDescriptor {
    #[must_use]
    pub fn new(
        streaming_link: impl Into<String>,
        servers: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            streaming_link: streaming_link.into(),
            servers: servers.into(),
            error: error.into(),
        }
    }
}

/// Link as returned by a default-provider adapter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Unnormalized adapter result
///
/// A missing `link` (or `link.file`) is the adapter's failure signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLinkResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<RawLink>,
    pub tracks: Vec<Track>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outro: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_fallback: Option<bool>,
}

impl RawLinkResult {
    /// Direct media URL, if the adapter produced a non-empty one
    #[must_use]
    pub fn direct_file(&self) -> Option<&str> {
        self.link
            .as_ref()
            .and_then(|l| l.file.as_deref())
            .filter(|f| !f.is_empty())
    }
}

/// Outcome of a stream resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resolution {
    /// Playable, proxied stream
    Stream(StreamDescriptor),
    /// Extraction failed; carries the reason
    Degraded(DegradedDescriptor),
    /// Adapter result without a usable link, returned unmodified
    Passthrough(RawLinkResult),
}

impl Resolution {
    #[must_use]
    pub const fn is_playable(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    #[must_use]
    pub const fn as_stream(&self) -> Option<&StreamDescriptor> {
        match self {
            Self::Stream(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_degraded(&self) -> Option<&DegradedDescriptor> {
        match self {
            Self::Degraded(descriptor) => Some(descriptor),
            _ => None,
        }
    }
}
