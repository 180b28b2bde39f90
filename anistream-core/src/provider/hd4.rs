//! HD-4 Extractor
//!
//! Resolves the "HD-4" server through the megaplay embed protocol:
//!
//! 1. fetch the embed page and read its `data-id`
//! 2. fetch the sources for that id
//! 3. proxy the direct media URL with the megaplay origin as referer
//!
//! Every failure ends in a [`DegradedDescriptor`]; nothing propagates past
//! [`Hd4Extractor::extract`].

use anistream_media_providers::{markup, megaplay::SourcesResponse, MegaplayClient, ProviderClientError};
use anistream_proxy::ProxyRewriter;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::kind::HD4_SERVER_NAME;
use crate::models::{
    DegradedDescriptor, Resolution, StreamDescriptor, StreamLink, TimeRange, Track, Variant,
};

pub const NO_DATA_ID_ERROR: &str = "Could not extract streaming data";
pub const NO_FILE_ERROR: &str = "No streaming file found";

/// HD-4 (megaplay) extractor
#[derive(Clone)]
pub struct Hd4Extractor {
    client: MegaplayClient,
    rewriter: ProxyRewriter,
}

impl Hd4Extractor {
    #[must_use]
    pub const fn new(client: MegaplayClient, rewriter: ProxyRewriter) -> Self {
        Self { client, rewriter }
    }

    #[must_use]
    pub const fn client(&self) -> &MegaplayClient {
        &self.client
    }

    /// Resolve `episode_id` in `variant`.
    pub async fn extract(&self, episode_id: &str, variant: Variant) -> Resolution {
        let embed_url = self.client.embed_url(episode_id, variant.as_str());

        match self.run(episode_id, variant, &embed_url).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!("HD-4 extraction failed for {}: {}", embed_url, e);
                Resolution::Degraded(Self::degraded(&embed_url, e.to_string()))
            }
        }
    }

    async fn run(
        &self,
        episode_id: &str,
        variant: Variant,
        embed_url: &str,
    ) -> Result<Resolution, ProviderClientError> {
        let html = self.client.fetch_embed(embed_url).await?;

        let Some(data_id) = markup::data_id(&html) else {
            warn!("HD-4: no data-id in embed page {}", embed_url);
            return Ok(Resolution::Degraded(Self::degraded(embed_url, NO_DATA_ID_ERROR)));
        };
        debug!("HD-4: extracted data-id {}", data_id);

        let sources = self.client.fetch_sources(data_id, embed_url).await?;

        let Some(direct_url) = sources.file().map(str::to_string) else {
            warn!("HD-4: no streaming file in sources for data-id {}", data_id);
            return Ok(Resolution::Degraded(Self::degraded(embed_url, NO_FILE_ERROR)));
        };

        let descriptor = self.build_descriptor(episode_id, variant, direct_url, sources);
        info!("HD-4: resolved episode {} ({})", episode_id, variant);
        Ok(Resolution::Stream(descriptor))
    }

    fn build_descriptor(
        &self,
        episode_id: &str,
        variant: Variant,
        direct_url: String,
        sources: SourcesResponse,
    ) -> StreamDescriptor {
        let proxy_url = self.rewriter.build_url(&direct_url, self.client.host());

        let tracks = sources
            .track_values()
            .iter()
            .filter_map(|value| match Track::deserialize(value) {
                Ok(track) => Some(track),
                Err(e) => {
                    debug!("HD-4: skipping malformed track: {}", e);
                    None
                }
            })
            .collect();

        StreamDescriptor {
            id: episode_id.to_string(),
            variant,
            link: StreamLink::hls(direct_url, proxy_url),
            tracks,
            intro: sources.intro().map(TimeRange::from),
            outro: sources.outro().map(TimeRange::from),
            server: HD4_SERVER_NAME.to_string(),
            used_fallback: false,
            subtitle_backfill: None,
        }
    }

    fn degraded(embed_url: &str, error: impl Into<String>) -> DegradedDescriptor {
        DegradedDescriptor::new(embed_url, HD4_SERVER_NAME, error)
    }
}
