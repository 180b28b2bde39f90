// anistream Provider Clients
//
// This crate contains pure HTTP client implementations for upstream stream providers.
// These clients know nothing about stream descriptors and can be used standalone.
//
// Architecture:
// - anistream-media-providers: Pure HTTP clients (megaplay) + markup helpers
// - anistream-core/provider: extractors that turn client responses into descriptors

// Shared error types
pub mod error;

// Embed markup helpers
pub mod markup;

// HTTP clients
pub mod megaplay;

// Re-export client types for convenience
pub use error::ProviderClientError;
pub use megaplay::MegaplayClient;
