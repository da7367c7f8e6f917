use reelkey_parse::MediaKind;
use serde::Deserialize;

use crate::traits::{SearchResult, TitleDetails};

// ── OMDb response types ──────────────────────────────────────────

/// Fields every OMDb response carries, success or not.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbEnvelope {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl OmdbEnvelope {
    /// The API-level error message when `Response` is `"False"`.
    pub fn failure(&self) -> Option<String> {
        let failed = self
            .response
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("false"));
        failed.then(|| self.error.clone().unwrap_or_else(|| "OMDb error".into()))
    }
}

/// `?s=` search response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbSearchResponse {
    #[serde(default)]
    pub search: Vec<OmdbSearchItem>,
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OmdbSearchItem {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub media_type: Option<String>,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
}

/// `?i=` lookup response.
#[derive(Debug, Deserialize)]
pub struct OmdbTitle {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
    #[serde(rename = "Runtime", default)]
    pub runtime: Option<String>,
    #[serde(rename = "Genre", default)]
    pub genre: Option<String>,
    #[serde(rename = "Plot", default)]
    pub plot: Option<String>,
    #[serde(rename = "Poster", default)]
    pub poster: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: String,
    #[serde(rename = "Type", default)]
    pub media_type: Option<String>,
}

// ── Conversions ──────────────────────────────────────────────────

/// OMDb spells missing values as `"N/A"`.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "N/A")
}

impl OmdbSearchItem {
    pub fn into_search_result(self) -> SearchResult {
        let media_type = present(self.media_type);
        SearchResult {
            id: self.imdb_id,
            title: present(self.title).unwrap_or_else(|| "Untitled".into()),
            year: present(self.year),
            kind: media_type.as_deref().and_then(MediaKind::from_remote_type),
            media_type,
            poster_url: present(self.poster),
        }
    }
}

impl OmdbTitle {
    pub fn into_details(self) -> TitleDetails {
        let media_type = present(self.media_type);
        TitleDetails {
            id: self.imdb_id,
            title: present(self.title).unwrap_or_else(|| "Untitled".into()),
            year: present(self.year),
            kind: media_type.as_deref().and_then(MediaKind::from_remote_type),
            media_type,
            poster_url: present(self.poster),
            plot: present(self.plot),
            genre: present(self.genre),
            runtime: present(self.runtime),
            rating: present(self.imdb_rating),
        }
    }
}
