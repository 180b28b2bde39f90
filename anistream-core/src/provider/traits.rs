// Collaborator Traits
//
// Interfaces for the components this crate delegates to: the site's server
// listing and the default provider adapter.

use async_trait::async_trait;

use super::CollaboratorError;
use crate::models::{RawLinkResult, ServerListing, ServerSelection};

/// Lists the servers offered for an episode
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServerLister: Send + Sync {
    /// Fetch servers for `content_ref`, grouped by variant
    async fn get_servers(&self, content_ref: &str) -> Result<ServerListing, CollaboratorError>;
}

/// Default provider adapter
///
/// Performs the provider's own extraction for every server that has no
/// dedicated extractor in this crate. The returned link is the direct media
/// URL; proxying is applied by the resolver.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamAdapter: Send + Sync {
    /// Extract the raw link for `selection`.
    ///
    /// A result without `link.file` is treated as an adapter-level failure
    /// and passed through to the caller.
    async fn extract(
        &self,
        selection: &ServerSelection,
        episode_ref: &str,
    ) -> Result<RawLinkResult, CollaboratorError>;
}
