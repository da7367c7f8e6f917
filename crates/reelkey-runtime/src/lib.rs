//! The privileged relay.
//!
//! [`Runtime`] owns the configuration (API key included), performs every
//! metadata request, opens embed URLs and pushes redacted settings and toggle
//! commands to subscribed page contexts.

mod launcher;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use reelkey_api::{embed_url, MetadataService, OmdbClient, OmdbError, SearchResult, TitleDetails};
use reelkey_core::config::{AppConfig, Configuration};
use reelkey_core::relay::{ContentMessage, Relay, RelayError, RelayRequest, RelayResponse};
use reelkey_parse::shortcut::DEFAULT_SHORTCUT;
use reelkey_parse::{MediaKind, ShortcutSpec};

pub use launcher::{Launcher, RecordingLauncher, SystemLauncher};

/// Shown in place of results when no key has been saved yet.
pub const MISSING_KEY_MESSAGE: &str = "No OMDb API key configured. Add one in the settings.";

const BROADCAST_CAPACITY: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error("http client error: {0}")]
    Http(String),
}

/// Partial settings update from the settings surface. `None` leaves a field
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub api_key: Option<String>,
    #[serde(rename = "inPageShortcut")]
    pub shortcut: Option<String>,
}

pub struct Runtime<L: Launcher = SystemLauncher> {
    config: Arc<RwLock<AppConfig>>,
    config_path: Option<PathBuf>,
    http: reqwest::Client,
    events: broadcast::Sender<ContentMessage>,
    launcher: L,
}

impl<L: Launcher> Runtime<L> {
    /// An in-memory runtime. Settings changes are only persisted once a
    /// path is set with [`Runtime::with_config_path`].
    pub fn new(config: AppConfig, launcher: L) -> Result<Self, RuntimeError> {
        let http = OmdbClient::http_client(config.relay_timeout())
            .map_err(|e| RuntimeError::Http(e.to_string()))?;
        let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path: None,
            http,
            events,
            launcher,
        })
    }

    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub async fn get_config(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Receive toggle commands and configuration pushes.
    pub fn subscribe(&self) -> broadcast::Receiver<ContentMessage> {
        self.events.subscribe()
    }

    /// Ask every page context to toggle its overlay.
    pub fn toggle_overlay(&self) -> usize {
        self.publish(ContentMessage::ToggleOverlay)
    }

    /// Push the current shortcut to every page context.
    pub async fn broadcast_config(&self) -> usize {
        let settings = self.config.read().await.broadcast();
        self.publish(ContentMessage::ConfigUpdated { settings })
    }

    fn publish(&self, message: ContentMessage) -> usize {
        // No subscribers is not an error: no page is open.
        let receivers = self.events.send(message).unwrap_or(0);
        tracing::debug!(receivers, "published to page contexts");
        receivers
    }

    /// Apply a settings change, persist it and broadcast the new shortcut.
    ///
    /// A blank shortcut resets to the default; a blank key is ignored (use
    /// [`Runtime::clear_api_key`] to remove it).
    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Configuration, RuntimeError> {
        let snapshot = {
            let mut config = self.config.write().await;
            let mut next = config.clone();

            if let Some(shortcut) = patch.shortcut {
                let shortcut = match shortcut.trim() {
                    "" => DEFAULT_SHORTCUT,
                    s => s,
                };
                let spec = ShortcutSpec::parse(shortcut)
                    .map_err(|e| RuntimeError::Config(e.to_string()))?;
                next.overlay.shortcut = spec.to_string();
            }
            if let Some(key) = patch.api_key {
                let key = key.trim();
                if !key.is_empty() {
                    next.omdb.api_key = key.to_string();
                }
            }

            self.persist(&next)?;
            *config = next;
            config.configuration()
        };

        tracing::info!(shortcut = %snapshot.shortcut, "settings updated");
        self.broadcast_config().await;
        Ok(snapshot)
    }

    pub async fn clear_api_key(&self) -> Result<(), RuntimeError> {
        let mut config = self.config.write().await;
        let mut next = config.clone();
        next.omdb.api_key.clear();
        self.persist(&next)?;
        *config = next;
        tracing::info!("api key cleared");
        Ok(())
    }

    fn persist(&self, config: &AppConfig) -> Result<(), RuntimeError> {
        if let Some(path) = &self.config_path {
            config
                .save_to(path)
                .map_err(|e| RuntimeError::Config(e.to_string()))?;
        }
        Ok(())
    }

    async fn omdb(&self) -> OmdbClient {
        let config = self.config.read().await;
        OmdbClient::with_http(self.http.clone(), config.omdb.api_key.clone())
            .with_base_url(config.omdb.base_url.clone())
            .with_max_results(config.omdb.max_results)
    }

    /// Answer one wire request.
    pub async fn handle(&self, request: RelayRequest) -> RelayResponse {
        let response = match request {
            RelayRequest::Search { query, filter_type } => self
                .search(&query, filter_type)
                .await
                .map(RelayResponse::results),
            RelayRequest::LookupById { id } => {
                self.lookup_by_id(&id).await.map(RelayResponse::data)
            }
            RelayRequest::OpenEmbed { id, kind } => {
                self.open_embed(&id, kind).await.map(RelayResponse::url)
            }
            RelayRequest::BroadcastConfig => {
                self.broadcast_config().await;
                Ok(RelayResponse::ok())
            }
        };
        response.unwrap_or_else(|e| RelayResponse::error(&e))
    }
}

fn relay_error(err: OmdbError) -> RelayError {
    match err {
        OmdbError::Response(message) => RelayError::Api(message),
        OmdbError::MissingApiKey => RelayError::Api(MISSING_KEY_MESSAGE.into()),
        OmdbError::InvalidInput(_) => RelayError::MissingIdentifier,
        other => RelayError::Transport(other.to_string()),
    }
}

impl<L: Launcher> Relay for Runtime<L> {
    async fn search(
        &self,
        query: &str,
        filter: Option<MediaKind>,
    ) -> Result<Vec<SearchResult>, RelayError> {
        let client = self.omdb().await;
        client.search_titles(query, filter).await.map_err(|e| {
            tracing::debug!(query, error = %e, "search failed");
            relay_error(e)
        })
    }

    async fn lookup_by_id(&self, id: &str) -> Result<TitleDetails, RelayError> {
        let client = self.omdb().await;
        client.get_title(id).await.map_err(relay_error)
    }

    async fn open_embed(&self, id: &str, kind: MediaKind) -> Result<String, RelayError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(RelayError::MissingIdentifier);
        }
        let host = self.config.read().await.embed.host.clone();
        let url = embed_url(&host, id, kind).map_err(|e| RelayError::Launch(e.to_string()))?;

        self.launcher
            .open(url.as_str())
            .map_err(|e| RelayError::Launch(e.to_string()))?;
        tracing::info!(%url, %kind, "embed opened");
        Ok(url.into())
    }

    async fn configuration(&self) -> Configuration {
        self.config.read().await.configuration()
    }
}
