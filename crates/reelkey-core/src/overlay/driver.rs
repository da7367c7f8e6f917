//! Runs an [`Overlay`] on tokio.
//!
//! The driver owns the state machine, the view and the relay handle. It
//! performs each [`Effect`] and routes timer and relay completions back into
//! the state machine through an internal channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;

use super::{Effect, Message, Overlay, SearchOutcome};
use crate::relay::{bounded, Relay};

/// The surface an overlay is drawn on.
pub trait OverlayView: Send {
    fn show(&mut self);
    fn hide(&mut self);
    fn focus_input(&mut self);
    fn render(&mut self, overlay: &Overlay);

    /// The key that produced the last transition must not reach the page.
    fn consume_key(&mut self) {}

    /// An embed was opened (or failed to open) for `id`.
    fn embed_opened(&mut self, _id: &str, _result: Result<&str, &str>) {}
}

pub struct OverlayDriver<R: Relay, V: OverlayView> {
    overlay: Overlay,
    relay: Arc<R>,
    view: V,
    timeout: Duration,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
    opened_tx: mpsc::UnboundedSender<(String, Result<String, String>)>,
    opened_rx: mpsc::UnboundedReceiver<(String, Result<String, String>)>,
    debounce: Option<JoinHandle<()>>,
    /// In-flight searches and embed opens.
    tasks: JoinSet<()>,
}

impl<R: Relay, V: OverlayView> OverlayDriver<R, V> {
    pub fn new(overlay: Overlay, relay: Arc<R>, view: V) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (opened_tx, opened_rx) = mpsc::unbounded_channel();
        Self {
            overlay,
            relay,
            view,
            timeout: Duration::from_secs(10),
            tx,
            rx,
            opened_tx,
            opened_rx,
            debounce: None,
            tasks: JoinSet::new(),
        }
    }

    /// Upper bound on each relay call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// A sender for feeding messages from other tasks.
    pub fn sender(&self) -> mpsc::UnboundedSender<Message> {
        self.tx.clone()
    }

    /// Apply one message and perform the resulting effects.
    pub fn dispatch(&mut self, message: Message) {
        for effect in self.overlay.update(message) {
            self.perform(effect);
        }
    }

    /// Wait for the next internal completion (debounce, search or embed
    /// open) and apply it. Returns `false` without waiting when nothing is
    /// pending.
    pub async fn step(&mut self) -> bool {
        if self.is_idle() {
            return false;
        }
        tokio::select! {
            Some(message) = self.rx.recv() => {
                self.dispatch(message);
                true
            }
            Some((id, result)) = self.opened_rx.recv() => {
                self.view.embed_opened(&id, result.as_deref().map_err(String::as_str));
                true
            }
            else => false,
        }
    }

    /// Drive the overlay until `events` closes.
    pub async fn run(&mut self, mut events: mpsc::Receiver<Message>) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(message) => self.dispatch(message),
                    None => break,
                },
                Some(message) = self.rx.recv() => self.dispatch(message),
                Some((id, result)) = self.opened_rx.recv() => {
                    self.view.embed_opened(&id, result.as_deref().map_err(String::as_str));
                }
            }
        }
        self.cancel_debounce();
    }

    /// No timer or task can still deliver a completion, and none is queued.
    fn is_idle(&mut self) -> bool {
        // A task only finishes after sending, so check the tasks before the
        // channels.
        self.reap();
        let timer_done = self.debounce.as_ref().map_or(true, JoinHandle::is_finished);
        timer_done && self.tasks.is_empty() && self.rx.is_empty() && self.opened_rx.is_empty()
    }

    fn perform(&mut self, effect: Effect) {
        self.reap();
        match effect {
            Effect::Show => self.view.show(),
            Effect::Hide => self.view.hide(),
            Effect::FocusInput => self.view.focus_input(),
            Effect::Render => self.view.render(&self.overlay),
            Effect::ConsumeKey => self.view.consume_key(),
            Effect::CancelSearch => self.cancel_debounce(),
            Effect::ScheduleSearch { seq, delay } => {
                self.cancel_debounce();
                // Deadline fixed now, not when the task is first polled.
                let deadline = Instant::now() + delay;
                let tx = self.tx.clone();
                self.debounce = Some(tokio::spawn(async move {
                    tokio::time::sleep_until(deadline).await;
                    let _ = tx.send(Message::DebounceElapsed { seq });
                }));
            }
            Effect::DispatchSearch { seq, query } => {
                self.debounce = None;
                let relay = Arc::clone(&self.relay);
                let tx = self.tx.clone();
                let timeout = self.timeout;
                tracing::debug!(seq, query = %query, "dispatching search");
                self.tasks.spawn(async move {
                    let result = bounded(timeout, relay.search(&query, None)).await;
                    let outcome = SearchOutcome::from(result);
                    let _ = tx.send(Message::SearchFinished { seq, outcome });
                });
            }
            Effect::OpenEmbed { id, kind } => {
                let relay = Arc::clone(&self.relay);
                let done = self.opened_tx.clone();
                let timeout = self.timeout;
                self.tasks.spawn(async move {
                    let result = bounded(timeout, relay.open_embed(&id, kind)).await;
                    let report = match result {
                        Ok(url) => {
                            tracing::info!(%id, %kind, %url, "embed opened");
                            Ok(url)
                        }
                        Err(e) => {
                            tracing::warn!(%id, error = %e, "could not open embed");
                            Err(e.to_string())
                        }
                    };
                    let _ = done.send((id, report));
                });
            }
        }
    }

    fn reap(&mut self) {
        while self.tasks.try_join_next().is_some() {}
    }

    fn cancel_debounce(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
    }
}

impl<R: Relay, V: OverlayView> Drop for OverlayDriver<R, V> {
    fn drop(&mut self) {
        self.cancel_debounce();
    }
}
