//! The privileged boundary between page contexts and the network.
//!
//! Page-side components (overlay, injector) never hold the API key or talk
//! to the metadata API themselves: every request goes through a [`Relay`].
//! The wire types mirror the JSON messages exchanged with the browser
//! extension shell.

use std::future::Future;
use std::time::Duration;

use reelkey_api::{SearchResult, TitleDetails};
use reelkey_parse::MediaKind;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::Configuration;
pub use crate::error::RelayError;

/// Privileged request broker.
pub trait Relay: Send + Sync + 'static {
    fn search(
        &self,
        query: &str,
        filter: Option<MediaKind>,
    ) -> impl Future<Output = Result<Vec<SearchResult>, RelayError>> + Send;

    fn lookup_by_id(&self, id: &str)
        -> impl Future<Output = Result<TitleDetails, RelayError>> + Send;

    /// Open the embed player for `id` in a new browsing context and return
    /// its URL.
    fn open_embed(
        &self,
        id: &str,
        kind: MediaKind,
    ) -> impl Future<Output = Result<String, RelayError>> + Send;

    fn configuration(&self) -> impl Future<Output = Configuration> + Send;
}

/// Await a relay call for at most `timeout`.
pub async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, RelayError>>,
) -> Result<T, RelayError> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| RelayError::Timeout(timeout))?
}

// ── Wire messages ───────────────────────────────────────────────

/// Request from a page context to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RelayRequest {
    #[serde(rename = "omdb-search")]
    Search {
        query: String,
        #[serde(rename = "filterType", default, skip_serializing_if = "Option::is_none")]
        filter_type: Option<MediaKind>,
    },
    #[serde(rename = "omdb-by-id")]
    LookupById {
        #[serde(rename = "imdbId")]
        id: String,
    },
    #[serde(rename = "open-vidsrc")]
    OpenEmbed {
        #[serde(rename = "imdbId")]
        id: String,
        #[serde(rename = "mediaType", default, deserialize_with = "embed_kind")]
        kind: MediaKind,
    },
    BroadcastConfig,
}

/// `"series"` opens the series route; any other value opens as a movie.
fn embed_kind<'de, D: Deserializer<'de>>(de: D) -> Result<MediaKind, D::Error> {
    let raw = Option::<String>::deserialize(de)?;
    Ok(match raw.as_deref().map(str::trim) {
        Some(kind) if kind.eq_ignore_ascii_case("series") => MediaKind::Series,
        _ => MediaKind::Movie,
    })
}

/// Reply to a [`RelayRequest`]. Exactly one payload field is set when `ok`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SearchResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TitleDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            ..Default::default()
        }
    }

    pub fn results(results: Vec<SearchResult>) -> Self {
        Self {
            results: Some(results),
            ..Self::ok()
        }
    }

    pub fn data(details: TitleDetails) -> Self {
        Self {
            data: Some(details),
            ..Self::ok()
        }
    }

    pub fn url(url: String) -> Self {
        Self {
            url: Some(url),
            ..Self::ok()
        }
    }

    pub fn error(err: &RelayError) -> Self {
        Self {
            ok: false,
            error: Some(err.to_string()),
            ..Default::default()
        }
    }
}

/// Settings subset pushed to page contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBroadcast {
    #[serde(rename = "inPageShortcut")]
    pub shortcut: String,
}

/// Message pushed from the relay to page contexts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentMessage {
    ToggleOverlay,
    ConfigUpdated { settings: ConfigBroadcast },
}
