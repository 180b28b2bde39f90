//! Megaplay Provider Client
//!
//! Pure HTTP client for the megaplay embed host that backs the "HD-4" server.
//!
//! # Protocol
//! 1. Fetch the embed page for an episode/variant and read its `data-id`
//! 2. Fetch the JSON sources for that id, sending the embed page as referer
//!
//! # Example
//!
//! ```no_run
//! use anistream_media_providers::megaplay::MegaplayClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MegaplayClient::new();
//! let embed_url = client.embed_url("12345", "sub");
//! let html = client.fetch_embed(&embed_url).await?;
//! if let Some(id) = anistream_media_providers::markup::data_id(&html) {
//!     let sources = client.fetch_sources(id, &embed_url).await?;
//!     println!("{:?}", sources.file());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod types;

pub use client::{MegaplayClient, DEFAULT_HOST, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use types::*;
