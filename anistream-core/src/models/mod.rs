pub mod descriptor;
pub mod selection;

pub use descriptor::{
    BackfillOutcome, DegradedDescriptor, RawLink, RawLinkResult, Resolution, StreamDescriptor,
    StreamKind, StreamLink, TimeRange, Track,
};
pub use selection::{episode_id_from_ref, ServerEntry, ServerListing, ServerSelection, Variant};
