//! Stream Resolution
//!
//! Entry point of the pipeline: dispatches a server selection to its
//! extractor, proxies the resulting link and backfills dub subtitles.

use std::sync::Arc;

use anistream_media_providers::MegaplayClient;
use anistream_proxy::ProxyRewriter;
use tracing::{info, instrument, warn};

use super::{Hd4Extractor, ServerKind, ServerLister, StreamAdapter, SubtitleBackfill};
use crate::config::Config;
use crate::models::{
    episode_id_from_ref, DegradedDescriptor, RawLinkResult, Resolution, ServerSelection,
    StreamDescriptor, StreamLink,
};

/// Resolves server selections into stream descriptors
#[derive(Clone)]
pub struct StreamResolver {
    hd4: Hd4Extractor,
    adapter: Arc<dyn StreamAdapter>,
    backfill: SubtitleBackfill,
    rewriter: ProxyRewriter,
}

impl StreamResolver {
    #[must_use]
    pub fn new(
        hd4: Hd4Extractor,
        adapter: Arc<dyn StreamAdapter>,
        lister: Arc<dyn ServerLister>,
        rewriter: ProxyRewriter,
    ) -> Self {
        Self {
            hd4,
            backfill: SubtitleBackfill::new(lister, Arc::clone(&adapter)),
            adapter,
            rewriter,
        }
    }

    /// Build a resolver from configuration and the external collaborators.
    #[must_use]
    pub fn from_config(
        config: &Config,
        adapter: Arc<dyn StreamAdapter>,
        lister: Arc<dyn ServerLister>,
    ) -> Self {
        let rewriter = ProxyRewriter::new(
            config.proxy.base_url.as_str(),
            config.proxy.default_referer.as_str(),
        );
        let client = MegaplayClient::with_host(config.hd4.host.as_str())
            .user_agent(config.hd4.user_agent.as_str())
            .timeout(config.hd4.timeout());

        Self::new(Hd4Extractor::new(client, rewriter.clone()), adapter, lister, rewriter)
    }

    /// Resolve `selection` for the episode referenced by `episode_ref`.
    ///
    /// Never fails: extraction problems come back as [`Resolution::Degraded`]
    /// and adapter results without a link as [`Resolution::Passthrough`].
    #[instrument(
        skip(self, selection, episode_ref),
        fields(
            server = %selection.name,
            variant = %selection.variant,
            episode_id = %episode_id_from_ref(episode_ref)
        )
    )]
    pub async fn resolve(&self, selection: &ServerSelection, episode_ref: &str) -> Resolution {
        let episode_id = episode_id_from_ref(episode_ref);

        match ServerKind::of(selection) {
            ServerKind::Hd4 => self.hd4.extract(episode_id, selection.variant).await,
            ServerKind::Default => self.resolve_default(selection, episode_ref, episode_id).await,
        }
    }

    async fn resolve_default(
        &self,
        selection: &ServerSelection,
        episode_ref: &str,
        episode_id: &str,
    ) -> Resolution {
        let raw = match self.adapter.extract(selection, episode_ref).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Adapter failed for {}: {}", selection.name, e);
                return Resolution::Degraded(DegradedDescriptor::new(
                    episode_ref,
                    selection.name.as_str(),
                    e.to_string(),
                ));
            }
        };

        let Some(direct_url) = raw.direct_file().map(str::to_string) else {
            warn!("Adapter returned no link for {}", selection.name);
            return Resolution::Passthrough(raw);
        };

        let descriptor = self.normalize(selection, episode_id, direct_url, raw);
        let descriptor = self.backfill.apply(selection, episode_ref, descriptor).await;

        info!("Resolved {} stream for episode {}", selection.name, episode_id);
        Resolution::Stream(descriptor)
    }

    /// Proxy the adapter's direct URL and fill in the descriptor defaults.
    fn normalize(
        &self,
        selection: &ServerSelection,
        episode_id: &str,
        direct_url: String,
        raw: RawLinkResult,
    ) -> StreamDescriptor {
        let proxy_url = self.rewriter.rewrite(&direct_url);

        StreamDescriptor {
            id: raw.id.unwrap_or_else(|| episode_id.to_string()),
            variant: raw.variant.unwrap_or(selection.variant),
            link: StreamLink::hls(direct_url, proxy_url),
            tracks: raw.tracks,
            intro: raw.intro,
            outro: raw.outro,
            server: raw.server.unwrap_or_else(|| selection.name.clone()),
            used_fallback: raw.used_fallback.unwrap_or(false),
            subtitle_backfill: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawLink, ServerEntry, ServerListing, Track, Variant};
    use crate::provider::traits::{MockServerLister, MockStreamAdapter};
    use crate::provider::CollaboratorError;

    fn raw_with_file(file: &str) -> RawLinkResult {
        RawLinkResult {
            link: Some(RawLink {
                file: Some(file.to_string()),
                kind: Some("hls".to_string()),
            }),
            ..RawLinkResult::default()
        }
    }

    fn resolver(adapter: MockStreamAdapter, lister: MockServerLister) -> StreamResolver {
        StreamResolver::new(
            Hd4Extractor::new(
                MegaplayClient::with_host("http://127.0.0.1:9"),
                ProxyRewriter::default(),
            ),
            Arc::new(adapter),
            Arc::new(lister),
            ProxyRewriter::default(),
        )
    }

    fn decoded_url_param(proxied: &str) -> String {
        url::Url::parse(proxied)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "url")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[tokio::test]
    async fn test_default_server_is_proxied() {
        let mut adapter = MockStreamAdapter::new();
        adapter
            .expect_extract()
            .withf(|selection, episode_ref| selection.name == "HD-1" && episode_ref == "show-1?ep=42")
            .times(1)
            .returning(|_, _| Ok(raw_with_file("https://cdn.example.com:8443/m.m3u8")));

        let r = resolver(adapter, MockServerLister::new());
        let resolution = r
            .resolve(&ServerSelection::new("HD-1", Variant::Sub), "show-1?ep=42")
            .await;
        let descriptor = resolution.as_stream().expect("stream");

        assert_eq!(descriptor.id, "42");
        assert_eq!(descriptor.server, "HD-1");
        assert_eq!(descriptor.variant, Variant::Sub);
        assert!(!descriptor.used_fallback);
        assert_eq!(descriptor.link.file(), descriptor.link.proxy_url());
        assert_eq!(descriptor.link.direct_url(), "https://cdn.example.com:8443/m.m3u8");
        assert_eq!(
            decoded_url_param(descriptor.link.file()),
            descriptor.link.direct_url()
        );
        assert!(descriptor
            .link
            .proxy_url()
            .ends_with("&referer=https%3A%2F%2Fcdn.example.com%3A8443"));
        assert!(descriptor.subtitle_backfill.is_none());
    }

    #[tokio::test]
    async fn test_raw_fields_are_kept() {
        let mut adapter = MockStreamAdapter::new();
        adapter.expect_extract().returning(|_, _| {
            Ok(RawLinkResult {
                id: Some("raw-id".to_string()),
                server: Some("megacloud".to_string()),
                used_fallback: Some(true),
                tracks: vec![Track::new("captions")],
                ..raw_with_file("https://cdn/a.m3u8")
            })
        });

        let r = resolver(adapter, MockServerLister::new());
        let resolution = r.resolve(&ServerSelection::new("HD-2", Variant::Sub), "9").await;
        let descriptor = resolution.as_stream().expect("stream");

        assert_eq!(descriptor.id, "raw-id");
        assert_eq!(descriptor.server, "megacloud");
        assert!(descriptor.used_fallback);
        assert_eq!(descriptor.tracks.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_link_passes_through() {
        let mut adapter = MockStreamAdapter::new();
        adapter.expect_extract().returning(|_, _| {
            Ok(RawLinkResult {
                server: Some("HD-1".to_string()),
                ..RawLinkResult::default()
            })
        });
        let mut lister = MockServerLister::new();
        lister.expect_get_servers().never();

        let r = resolver(adapter, lister);
        let resolution = r.resolve(&ServerSelection::new("HD-1", Variant::Dub), "ep=1").await;

        match resolution {
            Resolution::Passthrough(raw) => {
                assert!(raw.link.is_none());
                assert_eq!(raw.server.as_deref(), Some("HD-1"));
            }
            other => panic!("expected passthrough, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_adapter_error_degrades() {
        let mut adapter = MockStreamAdapter::new();
        adapter
            .expect_extract()
            .returning(|_, _| Err(CollaboratorError::Upstream("decrypt failed".to_string())));

        let r = resolver(adapter, MockServerLister::new());
        let resolution = r.resolve(&ServerSelection::new("HD-1", Variant::Sub), "show?ep=3").await;
        let degraded = resolution.as_degraded().expect("degraded");

        assert_eq!(degraded.servers, "HD-1");
        assert_eq!(degraded.streaming_link, "show?ep=3");
        assert_eq!(degraded.error, "Upstream error: decrypt failed");
    }

    #[tokio::test]
    async fn test_dub_without_captions_is_backfilled() {
        let mut adapter = MockStreamAdapter::new();
        adapter
            .expect_extract()
            .withf(|selection, _| selection.variant == Variant::Dub)
            .times(1)
            .returning(|_, _| Ok(raw_with_file("https://cdn/dub.m3u8")));
        adapter
            .expect_extract()
            .withf(|selection, _| selection.variant == Variant::Sub)
            .times(1)
            .returning(|_, _| {
                Ok(RawLinkResult {
                    tracks: vec![Track::new("captions"), Track::new("captions")],
                    ..raw_with_file("https://cdn/sub.m3u8")
                })
            });

        let mut lister = MockServerLister::new();
        lister.expect_get_servers().times(1).returning(|_| {
            Ok(ServerListing {
                sub: vec![ServerEntry {
                    name: "HD-1".to_string(),
                    index: Some(1),
                    id: Some("1001".to_string()),
                }],
                dub: vec![],
            })
        });

        let r = resolver(adapter, lister);
        let resolution = r.resolve(&ServerSelection::new("HD-1", Variant::Dub), "show?ep=5").await;
        let descriptor = resolution.as_stream().expect("stream");

        assert_eq!(descriptor.tracks.len(), 2);
        assert_eq!(descriptor.link.direct_url(), "https://cdn/dub.m3u8");
    }

    #[tokio::test]
    async fn test_dub_backfill_failure_keeps_stream() {
        let mut adapter = MockStreamAdapter::new();
        adapter
            .expect_extract()
            .times(1)
            .returning(|_, _| Ok(raw_with_file("https://cdn/dub.m3u8")));
        let mut lister = MockServerLister::new();
        lister
            .expect_get_servers()
            .returning(|_| Err(CollaboratorError::Unavailable("servers".to_string())));

        let r = resolver(adapter, lister);
        let resolution = r.resolve(&ServerSelection::new("HD-1", Variant::Dub), "show?ep=5").await;
        let descriptor = resolution.as_stream().expect("stream");

        assert!(descriptor.tracks.is_empty());
        assert!(descriptor.subtitle_backfill.is_some());
    }

    #[tokio::test]
    async fn test_hd4_does_not_touch_adapter() {
        let mut adapter = MockStreamAdapter::new();
        adapter.expect_extract().never();
        let mut lister = MockServerLister::new();
        lister.expect_get_servers().never();

        // Port 9 (discard) refuses connections, so the extractor degrades.
        let r = resolver(adapter, lister);
        let resolution = r.resolve(&ServerSelection::new("HD-4", Variant::Dub), "show?ep=77").await;
        let degraded = resolution.as_degraded().expect("degraded");

        assert_eq!(degraded.servers, "HD-4");
        assert_eq!(degraded.streaming_link, "http://127.0.0.1:9/stream/s-2/77/dub");
    }
}
