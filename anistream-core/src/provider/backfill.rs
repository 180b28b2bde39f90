//! Dub subtitle backfill
//!
//! Dubbed streams often ship without captions. When that happens the sub
//! variant of the same server is resolved and its text tracks are appended.
//! Backfill never fails the primary resolution; its outcome is recorded on
//! the descriptor instead.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{CollaboratorError, ServerLister, StreamAdapter};
use crate::models::{
    BackfillOutcome, ServerEntry, ServerListing, ServerSelection, StreamDescriptor, Track, Variant,
};

/// Appends sub-variant subtitles to dub descriptors
#[derive(Clone)]
pub struct SubtitleBackfill {
    lister: Arc<dyn ServerLister>,
    adapter: Arc<dyn StreamAdapter>,
}

impl SubtitleBackfill {
    #[must_use]
    pub fn new(lister: Arc<dyn ServerLister>, adapter: Arc<dyn StreamAdapter>) -> Self {
        Self { lister, adapter }
    }

    /// Dub selection whose descriptor carries no captions
    #[must_use]
    pub fn applies(selection: &ServerSelection, descriptor: &StreamDescriptor) -> bool {
        selection.variant == Variant::Dub && !descriptor.has_captions()
    }

    /// Backfill `descriptor` if [`Self::applies`]; otherwise return it unchanged.
    pub async fn apply(
        &self,
        selection: &ServerSelection,
        episode_ref: &str,
        mut descriptor: StreamDescriptor,
    ) -> StreamDescriptor {
        if !Self::applies(selection, &descriptor) {
            return descriptor;
        }

        debug!("Dub stream has no captions, looking up sub variant of {}", selection.name);

        let outcome = match self.fetch_sub_tracks(selection, episode_ref).await {
            Ok(Some(tracks)) if !tracks.is_empty() => {
                info!("Backfilled {} subtitle tracks from sub variant", tracks.len());
                let added = tracks.len();
                descriptor.tracks.extend(tracks);
                BackfillOutcome::Applied { added }
            }
            Ok(Some(_)) => {
                debug!("Sub variant of {} has no subtitle tracks", selection.name);
                BackfillOutcome::NoSubtitles
            }
            Ok(None) => {
                debug!("No sub server matches {}", selection.name);
                BackfillOutcome::NoMatchingServer
            }
            Err(e) => {
                warn!("Failed to fetch subtitles from sub variant: {}", e);
                BackfillOutcome::Failed { reason: e.to_string() }
            }
        };

        descriptor.subtitle_backfill = Some(outcome);
        descriptor
    }

    /// Text tracks of the matching sub server, or `None` without a match.
    async fn fetch_sub_tracks(
        &self,
        selection: &ServerSelection,
        episode_ref: &str,
    ) -> Result<Option<Vec<Track>>, CollaboratorError> {
        let listing = self.lister.get_servers(episode_ref).await?;

        let Some(entry) = find_sub_counterpart(&listing, selection).filter(|e| e.valid_id().is_some())
        else {
            return Ok(None);
        };

        let sub_selection = entry.to_selection(Variant::Sub);
        let raw = self.adapter.extract(&sub_selection, episode_ref).await?;

        Ok(Some(raw.tracks.into_iter().filter(Track::is_text).collect()))
    }
}

/// Sub server matching `selection`: first by name, then by index.
#[must_use]
pub fn find_sub_counterpart<'a>(
    listing: &'a ServerListing,
    selection: &ServerSelection,
) -> Option<&'a ServerEntry> {
    let subs = listing.servers(Variant::Sub);

    subs.iter().find(|s| s.name == selection.name).or_else(|| {
        selection
            .index
            .and_then(|index| subs.iter().find(|s| s.index == Some(index)))
    })
}
