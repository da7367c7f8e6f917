//! Trait definitions for title metadata services.
//!
//! The relay talks to the metadata API only through [`MetadataService`], so
//! the overlay and resolver never depend on a concrete provider.

use std::future::Future;

use reelkey_parse::MediaKind;
use serde::{Deserialize, Serialize};

/// A title metadata provider.
pub trait MetadataService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Search titles by free text, optionally restricted to one kind.
    fn search_titles(
        &self,
        query: &str,
        filter: Option<MediaKind>,
    ) -> impl Future<Output = Result<Vec<SearchResult>, Self::Error>> + Send;

    /// Fetch one title by its external identifier.
    fn get_title(&self, id: &str) -> impl Future<Output = Result<TitleDetails, Self::Error>> + Send;
}

/// One row of a search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// External identifier (`tt0133093`).
    pub id: String,
    pub title: String,
    pub year: Option<String>,
    /// `None` when the remote type is neither a movie nor a series.
    pub kind: Option<MediaKind>,
    /// Raw remote type string, kept for display.
    pub media_type: Option<String>,
    pub poster_url: Option<String>,
}

impl SearchResult {
    /// Kind used to open the embed; unknown kinds open as movies.
    pub fn embed_kind(&self) -> MediaKind {
        self.kind.unwrap_or_default()
    }
}

/// Full record for a single title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleDetails {
    pub id: String,
    pub title: String,
    pub year: Option<String>,
    pub media_type: Option<String>,
    pub kind: Option<MediaKind>,
    pub poster_url: Option<String>,
    pub plot: Option<String>,
    pub genre: Option<String>,
    pub runtime: Option<String>,
    pub rating: Option<String>,
}
