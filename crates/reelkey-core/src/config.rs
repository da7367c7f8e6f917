use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use reelkey_api::embed::DEFAULT_EMBED_HOST;
use reelkey_api::omdb::client::{BASE_URL, DEFAULT_MAX_RESULTS};
use reelkey_parse::shortcut::DEFAULT_SHORTCUT;
use reelkey_parse::title::DEFAULT_TITLE_PATTERN;
use reelkey_parse::{ShortcutSpec, TitlePattern};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::relay::ConfigBroadcast;

/// Annotated template written to the user config directory on first run.
pub const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
///
/// Every section falls back to its defaults, so a user file only needs the
/// keys it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub embed: EmbedConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub page: PageConfig,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub max_results: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub shortcut: String,
    pub debounce_ms: u64,
    pub min_query_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub title_pattern: String,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: BASE_URL.into(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            shortcut: DEFAULT_SHORTCUT.into(),
            debounce_ms: 250,
            min_query_len: 2,
        }
    }
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_EMBED_HOST.into(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title_pattern: DEFAULT_TITLE_PATTERN.into(),
        }
    }
}

// The key never reaches logs.
impl fmt::Debug for OmdbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OmdbConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .finish()
    }
}

/// The persisted settings pair exchanged with the settings surface.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub api_key: String,
    #[serde(rename = "inPageShortcut")]
    pub shortcut: String,
}

impl Configuration {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("api_key", &redact(&self.api_key))
            .field("shortcut", &self.shortcut)
            .finish()
    }
}

fn redact(key: &str) -> &'static str {
    if key.trim().is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl AppConfig {
    /// Load and validate a specific config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_unchecked(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without validating it, so a broken setting can
    /// still be shown and overwritten.
    pub fn load_unchecked(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write the annotated default template to `path` unless a file is
    /// already there. Returns whether a file was written.
    pub fn ensure_default_file(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, DEFAULT_CONFIG)?;
        Ok(true)
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "reelkey")
    }

    /// Reject settings the overlay or the injector could not run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shortcut()?;
        self.title_pattern()?;
        if self.overlay.min_query_len == 0 {
            return Err(ConfigError::Invalid("overlay.min_query_len must be at least 1".into()));
        }
        if self.relay.timeout_secs == 0 {
            return Err(ConfigError::Invalid("relay.timeout_secs must be at least 1".into()));
        }
        if self.omdb.max_results == 0 {
            return Err(ConfigError::Invalid("omdb.max_results must be at least 1".into()));
        }
        Ok(())
    }

    /// Reset every setting [`AppConfig::validate`] would reject to its
    /// default. Returns the names of the settings that were reset.
    pub fn repair(&mut self) -> Vec<&'static str> {
        let defaults = Self::default();
        let mut reset = Vec::new();

        if let Err(e) = self.shortcut() {
            tracing::warn!(error = %e, "using the default overlay shortcut");
            self.overlay.shortcut = defaults.overlay.shortcut;
            reset.push("overlay.shortcut");
        }
        if let Err(e) = self.title_pattern() {
            tracing::warn!(error = %e, "using the default title pattern");
            self.page.title_pattern = defaults.page.title_pattern;
            reset.push("page.title_pattern");
        }
        if self.overlay.min_query_len == 0 {
            tracing::warn!("overlay.min_query_len is 0, using the default");
            self.overlay.min_query_len = defaults.overlay.min_query_len;
            reset.push("overlay.min_query_len");
        }
        if self.relay.timeout_secs == 0 {
            tracing::warn!("relay.timeout_secs is 0, using the default");
            self.relay.timeout_secs = defaults.relay.timeout_secs;
            reset.push("relay.timeout_secs");
        }
        if self.omdb.max_results == 0 {
            tracing::warn!("omdb.max_results is 0, using the default");
            self.omdb.max_results = defaults.omdb.max_results;
            reset.push("omdb.max_results");
        }
        reset
    }

    pub fn shortcut(&self) -> Result<ShortcutSpec, ConfigError> {
        ShortcutSpec::parse(&self.overlay.shortcut)
            .map_err(|e| ConfigError::Invalid(format!("overlay.shortcut: {e}")))
    }

    pub fn title_pattern(&self) -> Result<TitlePattern, ConfigError> {
        TitlePattern::new(&self.page.title_pattern)
            .map_err(|e| ConfigError::Invalid(format!("page.title_pattern: {e}")))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.overlay.debounce_ms)
    }

    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay.timeout_secs)
    }

    pub fn configuration(&self) -> Configuration {
        Configuration {
            api_key: self.omdb.api_key.clone(),
            shortcut: self.overlay.shortcut.clone(),
        }
    }

    /// The subset pushed to page contexts. Never carries the API key.
    pub fn broadcast(&self) -> ConfigBroadcast {
        ConfigBroadcast {
            shortcut: self.overlay.shortcut.clone(),
        }
    }
}
