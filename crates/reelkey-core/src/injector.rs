//! Keeps a "watch" control on title pages.
//!
//! The host page may navigate without reloading (history API, back/forward
//! cache) and may rebuild its DOM at any time, so [`Injector::handle`] is
//! re-run on every navigation or mutation signal and converges on the same
//! state: exactly one control while the path is a title page, none otherwise.

use std::sync::Arc;
use std::time::Duration;

use reelkey_parse::{MediaKind, PageMetadata, TitlePattern};

use crate::relay::{bounded, Relay};
use crate::resolver::Resolver;

/// Signals that the page may have changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    HistoryPush,
    HistoryReplace,
    PopState,
    PageShow,
    Mutation,
}

/// The document the injector decorates.
pub trait PageHost {
    /// Handle to an attached control.
    type Control;

    fn path(&self) -> String;
    fn attach_control(&mut self, id: &str) -> Self::Control;
    /// Whether `control` is still part of the document.
    fn is_attached(&self, control: &Self::Control) -> bool;
    fn detach_control(&mut self, control: Self::Control);
    fn metadata(&self) -> PageMetadata;
}

#[derive(Debug)]
pub struct PageBinding<C> {
    pub current_path: String,
    pub control: Option<C>,
    pub resolved_id: Option<String>,
}

impl<C> Default for PageBinding<C> {
    fn default() -> Self {
        Self {
            current_path: String::new(),
            control: None,
            resolved_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectOutcome {
    Injected(String),
    Removed,
    Unchanged,
}

/// What an activation opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedRequest {
    pub id: String,
    pub kind: MediaKind,
    /// Embed URL, when the relay opened it.
    pub url: Option<String>,
}

pub struct Injector<C> {
    binding: PageBinding<C>,
    pattern: TitlePattern,
}

impl<C> Injector<C> {
    pub fn new(pattern: TitlePattern) -> Self {
        Self {
            binding: PageBinding::default(),
            pattern,
        }
    }

    pub fn binding(&self) -> &PageBinding<C> {
        &self.binding
    }

    pub fn handle<H>(&mut self, host: &mut H, event: NavEvent) -> InjectOutcome
    where
        H: PageHost<Control = C>,
    {
        let path = host.path();
        let mut removed = false;

        if path != self.binding.current_path {
            tracing::debug!(?event, from = %self.binding.current_path, to = %path, "page navigated");
            self.binding.current_path = path.clone();
            removed = self.remove(host);
        }

        let id = match self.pattern.extract_id(&path) {
            Some(id) => id,
            None => {
                removed |= self.remove(host);
                return if removed {
                    InjectOutcome::Removed
                } else {
                    InjectOutcome::Unchanged
                };
            }
        };

        if let Some(control) = &self.binding.control {
            if host.is_attached(control) {
                return InjectOutcome::Unchanged;
            }
            // The page rebuilt its DOM and took the control with it.
            tracing::trace!(?event, "control detached by page");
            self.binding.control = None;
        }

        let control = host.attach_control(&id);
        self.binding.control = Some(control);
        self.binding.resolved_id = Some(id.clone());
        tracing::debug!(?event, %id, "control injected");
        InjectOutcome::Injected(id)
    }

    /// Detach the current control, if any.
    fn remove<H>(&mut self, host: &mut H) -> bool
    where
        H: PageHost<Control = C>,
    {
        self.binding.resolved_id = None;
        match self.binding.control.take() {
            Some(control) => {
                host.detach_control(control);
                true
            }
            None => false,
        }
    }

    /// The control was clicked: resolve the kind and open the embed.
    ///
    /// Returns `None` when no title is bound. Relay failures are logged; the
    /// request is still returned so the caller knows what was attempted.
    pub async fn activate<R: Relay>(
        &self,
        relay: &Arc<R>,
        metadata: &PageMetadata,
        timeout: Duration,
    ) -> Option<EmbedRequest> {
        let id = self.binding.resolved_id.clone()?;
        let kind = Resolver::for_page(Arc::clone(relay), metadata, timeout)
            .resolve(&id)
            .await;

        let url = match bounded(timeout, relay.open_embed(&id, kind)).await {
            Ok(url) => {
                tracing::info!(%id, %kind, %url, "embed opened");
                Some(url)
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "could not open embed");
                None
            }
        };
        Some(EmbedRequest { id, kind, url })
    }
}
