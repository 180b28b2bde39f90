// Stream Provider System
//
// Two-tier architecture:
//
// Tier 1: anistream-media-providers (Pure provider HTTP clients)
//   - megaplay::MegaplayClient
//   - Independent library with no descriptor types
//
// Tier 2: anistream-core/provider (extractors + resolution)
//   - Hd4Extractor: megaplay embed protocol -> StreamDescriptor
//   - StreamAdapter / ServerLister: external collaborators
//   - SubtitleBackfill: dub caption enrichment
//   - StreamResolver: dispatch, proxying, backfill

// Core traits and types
pub mod error;
pub mod kind;
pub mod traits;

// Extractors and pipeline
pub mod backfill;
pub mod hd4;
pub mod resolver;

pub use error::*;
pub use kind::*;
pub use traits::*;

pub use backfill::SubtitleBackfill;
pub use hd4::Hd4Extractor;
pub use resolver::StreamResolver;
