use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Failures crossing the relay boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Application-level error from the metadata API, shown to the user verbatim.
    #[error("{0}")]
    Api(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("missing identifier")]
    MissingIdentifier,

    #[error("could not open embed: {0}")]
    Launch(String),

    #[error("relay did not answer within {0:?}")]
    Timeout(Duration),
}
