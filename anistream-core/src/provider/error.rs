// Provider Error Types

use anistream_media_providers::ProviderClientError;

/// Errors reported by external collaborators (server listing, default adapter)
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderClientError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CollaboratorError>;
