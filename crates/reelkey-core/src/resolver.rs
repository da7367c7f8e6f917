//! Decide whether a title is a movie or a series.
//!
//! A [`Resolver`] consults an ordered list of [`KindSignal`]s. The first
//! signal that answers wins; a signal that has nothing to say or fails is
//! skipped. When every signal abstains the title opens as a movie.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use reelkey_parse::page::json_ld_types;
use reelkey_parse::{MediaKind, PageMetadata};
use thiserror::Error;

use crate::relay::{bounded, Relay, RelayError};

pub type SignalFuture<'a> = BoxFuture<'a, Result<Option<MediaKind>, SignalError>>;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("all {0} JSON-LD blocks are malformed")]
    MalformedJsonLd(usize),
}

/// One source of evidence about a title's kind.
pub trait KindSignal: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the signal has no opinion.
    fn probe<'a>(&'a self, id: &'a str) -> SignalFuture<'a>;
}

// ── Signals ─────────────────────────────────────────────────────

/// Ask the relay for the title record and read its remote type.
pub struct RemoteLookup<R> {
    relay: Arc<R>,
    timeout: Duration,
}

impl<R: Relay> RemoteLookup<R> {
    pub fn new(relay: Arc<R>, timeout: Duration) -> Self {
        Self { relay, timeout }
    }
}

impl<R: Relay> KindSignal for RemoteLookup<R> {
    fn name(&self) -> &'static str {
        "remote-lookup"
    }

    fn probe<'a>(&'a self, id: &'a str) -> SignalFuture<'a> {
        async move {
            let details = bounded(self.timeout, self.relay.lookup_by_id(id)).await?;
            Ok(details
                .media_type
                .as_deref()
                .and_then(MediaKind::from_remote_type))
        }
        .boxed()
    }
}

/// The page's `og:type` meta tag.
pub struct OgTypeSignal {
    og_type: Option<String>,
}

impl OgTypeSignal {
    pub fn new(og_type: Option<String>) -> Self {
        Self { og_type }
    }
}

impl KindSignal for OgTypeSignal {
    fn name(&self) -> &'static str {
        "og-type"
    }

    fn probe<'a>(&'a self, _id: &'a str) -> SignalFuture<'a> {
        let kind = self.og_type.as_deref().and_then(MediaKind::from_og_type);
        future::ready(Ok(kind)).boxed()
    }
}

/// `@type` values in the page's JSON-LD blocks, in document order.
pub struct JsonLdSignal {
    blocks: Vec<String>,
}

impl JsonLdSignal {
    pub fn new(blocks: Vec<String>) -> Self {
        Self { blocks }
    }

    fn classify(&self) -> Result<Option<MediaKind>, SignalError> {
        let mut malformed = 0;
        for block in &self.blocks {
            match json_ld_types(block) {
                Ok(types) => {
                    if let Some(kind) = types.iter().find_map(|t| MediaKind::from_json_ld_type(t)) {
                        return Ok(Some(kind));
                    }
                }
                Err(e) => {
                    tracing::trace!(error = %e, "skipping malformed JSON-LD block");
                    malformed += 1;
                }
            }
        }
        if malformed > 0 && malformed == self.blocks.len() {
            return Err(SignalError::MalformedJsonLd(malformed));
        }
        Ok(None)
    }
}

impl KindSignal for JsonLdSignal {
    fn name(&self) -> &'static str {
        "json-ld"
    }

    fn probe<'a>(&'a self, _id: &'a str) -> SignalFuture<'a> {
        future::ready(self.classify()).boxed()
    }
}

// ── Resolver ────────────────────────────────────────────────────

#[derive(Default)]
pub struct Resolver {
    signals: Vec<Box<dyn KindSignal>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a signal; earlier signals take precedence.
    pub fn with_signal(mut self, signal: impl KindSignal + 'static) -> Self {
        self.signals.push(Box::new(signal));
        self
    }

    /// Remote lookup first, then `og:type`, then JSON-LD.
    pub fn for_page<R: Relay>(relay: Arc<R>, page: &PageMetadata, timeout: Duration) -> Self {
        Self::new()
            .with_signal(RemoteLookup::new(relay, timeout))
            .with_signal(OgTypeSignal::new(page.og_type.clone()))
            .with_signal(JsonLdSignal::new(page.json_ld.clone()))
    }

    pub async fn resolve(&self, id: &str) -> MediaKind {
        for signal in &self.signals {
            match signal.probe(id).await {
                Ok(Some(kind)) => {
                    tracing::debug!(signal = signal.name(), id, %kind, "media kind resolved");
                    return kind;
                }
                Ok(None) => {
                    tracing::trace!(signal = signal.name(), id, "signal abstained");
                }
                Err(e) => {
                    tracing::debug!(signal = signal.name(), id, error = %e, "signal failed");
                }
            }
        }
        tracing::debug!(id, "no signal matched, defaulting to movie");
        MediaKind::default()
    }
}
