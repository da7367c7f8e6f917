use thiserror::Error;

/// Errors from the OMDb API client.
#[derive(Debug, Error)]
pub enum OmdbError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// OMDb answered with `"Response": "False"`; the message is its `Error` field.
    #[error("{0}")]
    Response(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no OMDb API key configured")]
    MissingApiKey,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl OmdbError {
    /// Whether the failure happened below the API (network, status, decoding).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Api { .. } | Self::Parse(_))
    }
}
