// Server dispatch
//
// Maps a server name onto the extractor that knows how to resolve it.

use crate::models::ServerSelection;

/// Name the site uses for the megaplay-backed server
pub const HD4_SERVER_NAME: &str = "HD-4";

/// Extractor family responsible for a server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerKind {
    /// megaplay embed protocol, resolved in-process
    Hd4,
    /// Everything else, delegated to the default provider adapter
    Default,
}

impl ServerKind {
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            HD4_SERVER_NAME => Self::Hd4,
            _ => Self::Default,
        }
    }

    #[must_use]
    pub fn of(selection: &ServerSelection) -> Self {
        Self::from_name(&selection.name)
    }
}
