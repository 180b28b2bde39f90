//! Stream resolution core
//!
//! Turns a server selection for an episode into a playable, proxied stream
//! descriptor (or a degraded descriptor explaining why none could be built).

pub mod config;
pub mod logging;
pub mod models;
pub mod provider;

pub use config::Config;
pub use models::{Resolution, ServerSelection, StreamDescriptor, Variant};
pub use provider::StreamResolver;

