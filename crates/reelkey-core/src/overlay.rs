//! In-page search overlay.
//!
//! [`Overlay::update`] is a pure transition function: it mutates the session
//! and returns the [`Effect`]s the host must perform (show the panel, start a
//! debounce timer, call the relay, ...). [`driver::OverlayDriver`] performs
//! those effects on tokio and feeds completions back in as [`Message`]s.
//!
//! Every debounce schedule, cancel, open and close bumps a sequence number.
//! Timer and search completions carry the number they were issued under and
//! are dropped when it is no longer current, so a slow response can never
//! overwrite a newer one.

pub mod driver;

use std::time::Duration;

use reelkey_api::SearchResult;
use reelkey_parse::{KeyEvent, MediaKind, ShortcutSpec};

use crate::config::AppConfig;
use crate::relay::{ConfigBroadcast, ContentMessage, RelayError};

/// Shown when the relay could not be reached or did not answer.
pub const GENERIC_SEARCH_ERROR: &str = "Search failed. Check your connection and try again.";

// ── State ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Closed,
    /// Open, query below the minimum length.
    Empty,
    Searching,
    Results,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlaySession {
    pub is_open: bool,
    pub query: String,
    pub results: Vec<SearchResult>,
    pub selected: Option<usize>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySettings {
    pub shortcut: ShortcutSpec,
    pub debounce: Duration,
    pub min_query_len: usize,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            shortcut: ShortcutSpec::default(),
            debounce: Duration::from_millis(250),
            min_query_len: 2,
        }
    }
}

impl OverlaySettings {
    /// Settings from config. An unusable shortcut falls back to the default.
    pub fn from_config(config: &AppConfig) -> Self {
        let shortcut = config.shortcut().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default overlay shortcut");
            ShortcutSpec::default()
        });
        Self {
            shortcut,
            debounce: config.debounce(),
            min_query_len: config.overlay.min_query_len.max(1),
        }
    }
}

/// How a dispatched search ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Results(Vec<SearchResult>),
    /// The API answered with an error; shown verbatim.
    Failed(String),
    /// The relay or the network failed; the detail is logged, not shown.
    Unreachable(String),
}

impl From<Result<Vec<SearchResult>, RelayError>> for SearchOutcome {
    fn from(result: Result<Vec<SearchResult>, RelayError>) -> Self {
        match result {
            Ok(results) => Self::Results(results),
            Err(RelayError::Api(message)) => Self::Failed(message),
            Err(e) => Self::Unreachable(e.to_string()),
        }
    }
}

// ── Messages ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Toggle,
    Open,
    Close,
    /// A keydown seen anywhere in the page.
    Key(KeyEvent),
    QueryChanged(String),
    DebounceElapsed { seq: u64 },
    SearchFinished { seq: u64, outcome: SearchOutcome },
    BackdropClicked,
    RowHovered(usize),
    RowClicked(usize),
    ConfigUpdated(ConfigBroadcast),
}

impl From<ContentMessage> for Message {
    fn from(msg: ContentMessage) -> Self {
        match msg {
            ContentMessage::ToggleOverlay => Self::Toggle,
            ContentMessage::ConfigUpdated { settings } => Self::ConfigUpdated(settings),
        }
    }
}

/// Work the host performs after a transition, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Show,
    Hide,
    FocusInput,
    Render,
    /// Stop the key from reaching the page.
    ConsumeKey,
    /// Replace any pending debounce timer with one that fires after `delay`.
    ScheduleSearch { seq: u64, delay: Duration },
    CancelSearch,
    DispatchSearch { seq: u64, query: String },
    OpenEmbed { id: String, kind: MediaKind },
}

// ── Overlay ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Overlay {
    session: OverlaySession,
    phase: Phase,
    settings: OverlaySettings,
    seq: u64,
}

impl Overlay {
    pub fn new(settings: OverlaySettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn session(&self) -> &OverlaySession {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    pub fn is_open(&self) -> bool {
        self.session.is_open
    }

    /// Current sequence number.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn selected_result(&self) -> Option<&SearchResult> {
        self.session.selected.and_then(|i| self.session.results.get(i))
    }

    /// Text for the result area when there are no rows to show.
    pub fn status_line(&self) -> Option<String> {
        match self.phase {
            Phase::Closed => None,
            Phase::Empty => Some("Type at least 2 characters to search".into()),
            Phase::Searching => Some("Searching…".into()),
            Phase::Results if self.session.results.is_empty() => Some("No results".into()),
            Phase::Results => None,
            Phase::Error => self.session.last_error.clone(),
        }
    }

    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::Toggle => {
                if self.session.is_open {
                    self.close()
                } else {
                    self.open()
                }
            }
            Message::Open => {
                if self.session.is_open {
                    vec![Effect::FocusInput]
                } else {
                    self.open()
                }
            }
            Message::Close | Message::BackdropClicked => self.close(),
            Message::Key(event) => self.on_key(&event),
            Message::QueryChanged(query) => self.on_query(query),
            Message::DebounceElapsed { seq } => {
                if !self.is_current(seq) {
                    tracing::trace!(seq, current = self.seq, "stale debounce dropped");
                    return Vec::new();
                }
                vec![Effect::DispatchSearch {
                    seq,
                    query: self.session.query.trim().to_string(),
                }]
            }
            Message::SearchFinished { seq, outcome } => {
                if !self.is_current(seq) {
                    tracing::debug!(seq, current = self.seq, "stale search response dropped");
                    return Vec::new();
                }
                self.finish_search(outcome)
            }
            Message::RowHovered(index) => {
                if self.phase != Phase::Results
                    || index >= self.session.results.len()
                    || self.session.selected == Some(index)
                {
                    return Vec::new();
                }
                self.session.selected = Some(index);
                vec![Effect::Render]
            }
            Message::RowClicked(index) => {
                if self.phase != Phase::Results {
                    return Vec::new();
                }
                self.activate(Some(index))
            }
            Message::ConfigUpdated(broadcast) => {
                match ShortcutSpec::parse(&broadcast.shortcut) {
                    Ok(shortcut) => {
                        tracing::debug!(%shortcut, "overlay shortcut updated");
                        self.settings.shortcut = shortcut;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, shortcut = %broadcast.shortcut, "ignoring invalid shortcut");
                    }
                }
                Vec::new()
            }
        }
    }

    fn is_current(&self, seq: u64) -> bool {
        self.session.is_open && self.phase == Phase::Searching && seq == self.seq
    }

    fn bump(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn open(&mut self) -> Vec<Effect> {
        self.bump();
        self.session = OverlaySession {
            is_open: true,
            ..Default::default()
        };
        self.phase = Phase::Empty;
        vec![
            Effect::CancelSearch,
            Effect::Show,
            Effect::FocusInput,
            Effect::Render,
        ]
    }

    fn close(&mut self) -> Vec<Effect> {
        if !self.session.is_open {
            return Vec::new();
        }
        self.bump();
        self.session = OverlaySession::default();
        self.phase = Phase::Closed;
        vec![Effect::CancelSearch, Effect::Hide]
    }

    fn on_key(&mut self, event: &KeyEvent) -> Vec<Effect> {
        if self.settings.shortcut.matches(event) {
            let mut effects = vec![Effect::ConsumeKey];
            effects.extend(self.update(Message::Toggle));
            return effects;
        }
        if !self.session.is_open {
            return Vec::new();
        }

        if event.is("Escape") {
            let mut effects = vec![Effect::ConsumeKey];
            effects.extend(self.close());
            effects
        } else if event.is("ArrowDown") {
            let mut effects = vec![Effect::ConsumeKey];
            effects.extend(self.move_selection(1));
            effects
        } else if event.is("ArrowUp") {
            let mut effects = vec![Effect::ConsumeKey];
            effects.extend(self.move_selection(-1));
            effects
        } else if event.is("Enter") {
            let mut effects = vec![Effect::ConsumeKey];
            if self.phase == Phase::Results {
                effects.extend(self.activate(None));
            }
            effects
        } else {
            // Typing goes to the query input.
            Vec::new()
        }
    }

    fn on_query(&mut self, query: String) -> Vec<Effect> {
        if !self.session.is_open {
            return Vec::new();
        }
        let long_enough = query.trim().chars().count() >= self.settings.min_query_len;
        let seq = self.bump();
        self.session.query = query;
        self.session.results.clear();
        self.session.selected = None;
        self.session.last_error = None;

        if long_enough {
            self.phase = Phase::Searching;
            vec![
                Effect::ScheduleSearch {
                    seq,
                    delay: self.settings.debounce,
                },
                Effect::Render,
            ]
        } else {
            self.phase = Phase::Empty;
            vec![Effect::CancelSearch, Effect::Render]
        }
    }

    fn finish_search(&mut self, outcome: SearchOutcome) -> Vec<Effect> {
        match outcome {
            SearchOutcome::Results(results) => {
                self.session.selected = if results.is_empty() { None } else { Some(0) };
                self.session.results = results;
                self.phase = Phase::Results;
            }
            SearchOutcome::Failed(message) => {
                self.session.last_error = Some(message);
                self.phase = Phase::Error;
            }
            SearchOutcome::Unreachable(detail) => {
                tracing::warn!(error = %detail, "search failed");
                self.session.last_error = Some(GENERIC_SEARCH_ERROR.into());
                self.phase = Phase::Error;
            }
        }
        vec![Effect::Render]
    }

    /// Cycle the selection through the result list.
    fn move_selection(&mut self, step: isize) -> Vec<Effect> {
        let n = self.session.results.len();
        if self.phase != Phase::Results || n == 0 {
            return Vec::new();
        }
        let next = match (self.session.selected, step >= 0) {
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
            (None, true) => 0,
            (None, false) => n - 1,
        };
        self.session.selected = Some(next);
        vec![Effect::Render]
    }

    /// Open `index`, else the selection, else the only result.
    fn activate(&mut self, index: Option<usize>) -> Vec<Effect> {
        let results = &self.session.results;
        let index = index
            .or(self.session.selected)
            .or_else(|| (results.len() == 1).then_some(0));
        let Some(result) = index.and_then(|i| results.get(i)) else {
            return Vec::new();
        };
        if result.id.trim().is_empty() {
            return Vec::new();
        }

        let open = Effect::OpenEmbed {
            id: result.id.clone(),
            kind: result.embed_kind(),
        };
        tracing::debug!(id = %result.id, "activating result");
        let mut effects = vec![open];
        effects.extend(self.close());
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::result;
    use reelkey_parse::Modifiers;

    fn open_overlay() -> Overlay {
        let mut overlay = Overlay::default();
        overlay.update(Message::Open);
        overlay
    }

    fn key(name: &str) -> Message {
        Message::Key(KeyEvent::new(name))
    }

    fn ctrl_space() -> KeyEvent {
        KeyEvent::new(" ")
            .with_code("Space")
            .with_modifiers(Modifiers::CTRL)
    }

    fn matrix_results() -> Vec<SearchResult> {
        vec![
            result("tt0133093", "The Matrix", Some(MediaKind::Movie)),
            result("tt0234215", "The Matrix Reloaded", Some(MediaKind::Movie)),
        ]
    }

    /// Type `query` and let its search complete with `outcome`.
    fn search(overlay: &mut Overlay, query: &str, outcome: SearchOutcome) -> Vec<Effect> {
        overlay.update(Message::QueryChanged(query.into()));
        let seq = overlay.seq();
        overlay.update(Message::DebounceElapsed { seq });
        overlay.update(Message::SearchFinished { seq, outcome })
    }

    #[test]
    fn test_open_clears_session() {
        let mut overlay = Overlay::default();
        assert_eq!(overlay.phase(), Phase::Closed);

        let effects = overlay.update(Message::Open);
        assert_eq!(
            effects,
            vec![
                Effect::CancelSearch,
                Effect::Show,
                Effect::FocusInput,
                Effect::Render
            ]
        );
        assert_eq!(overlay.phase(), Phase::Empty);
        assert!(overlay.session().is_open);
        assert!(overlay.session().query.is_empty());
        assert_eq!(overlay.session().selected, None);
    }

    #[test]
    fn test_reopen_starts_fresh() {
        let mut overlay = open_overlay();
        search(&mut overlay, "Matrix", SearchOutcome::Results(matrix_results()));
        overlay.update(Message::Toggle);
        overlay.update(Message::Toggle);

        assert_eq!(overlay.phase(), Phase::Empty);
        assert!(overlay.session().results.is_empty());
        assert!(overlay.session().query.is_empty());
    }

    #[test]
    fn test_open_while_open_only_focuses() {
        let mut overlay = open_overlay();
        overlay.update(Message::QueryChanged("Ma".into()));
        assert_eq!(overlay.update(Message::Open), vec![Effect::FocusInput]);
        assert_eq!(overlay.session().query, "Ma");
    }

    #[test]
    fn test_shortcut_toggles() {
        let mut overlay = Overlay::default();

        let effects = overlay.update(Message::Key(ctrl_space()));
        assert_eq!(effects[0], Effect::ConsumeKey);
        assert!(effects.contains(&Effect::Show));
        assert!(overlay.is_open());

        let effects = overlay.update(Message::Key(ctrl_space()));
        assert_eq!(effects, vec![Effect::ConsumeKey, Effect::CancelSearch, Effect::Hide]);
        assert!(!overlay.is_open());
    }

    #[test]
    fn test_extra_modifier_does_not_toggle() {
        let mut overlay = Overlay::default();
        let event = KeyEvent::new(" ")
            .with_code("Space")
            .with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert!(overlay.update(Message::Key(event)).is_empty());
        assert!(!overlay.is_open());
    }

    #[test]
    fn test_keys_ignored_while_closed() {
        let mut overlay = Overlay::default();
        assert!(overlay.update(key("Escape")).is_empty());
        assert!(overlay.update(key("Enter")).is_empty());
        assert!(overlay.update(Message::QueryChanged("Matrix".into())).is_empty());
        assert_eq!(overlay.phase(), Phase::Closed);
    }

    #[test]
    fn test_short_query_makes_no_request() {
        let mut overlay = open_overlay();
        for query in ["", "M", " M ", "\u{3000}"] {
            let effects = overlay.update(Message::QueryChanged(query.into()));
            assert_eq!(effects, vec![Effect::CancelSearch, Effect::Render]);
            assert_eq!(overlay.phase(), Phase::Empty);
        }
    }

    #[test]
    fn test_query_schedules_debounced_search() {
        let mut overlay = open_overlay();
        let effects = overlay.update(Message::QueryChanged("Ma".into()));
        let seq = overlay.seq();
        assert_eq!(
            effects,
            vec![
                Effect::ScheduleSearch {
                    seq,
                    delay: Duration::from_millis(250)
                },
                Effect::Render
            ]
        );
        assert_eq!(overlay.phase(), Phase::Searching);
        assert_eq!(overlay.status_line().as_deref(), Some("Searching…"));
    }

    #[test]
    fn test_only_latest_debounce_dispatches() {
        let mut overlay = open_overlay();
        overlay.update(Message::QueryChanged("Ma".into()));
        let first = overlay.seq();
        overlay.update(Message::QueryChanged("  Matrix ".into()));
        let second = overlay.seq();
        assert!(second > first);

        assert!(overlay.update(Message::DebounceElapsed { seq: first }).is_empty());
        assert_eq!(
            overlay.update(Message::DebounceElapsed { seq: second }),
            vec![Effect::DispatchSearch {
                seq: second,
                query: "Matrix".into()
            }]
        );
    }

    #[test]
    fn test_results_select_first() {
        let mut overlay = open_overlay();
        let effects = search(&mut overlay, "Matrix", SearchOutcome::Results(matrix_results()));
        assert_eq!(effects, vec![Effect::Render]);
        assert_eq!(overlay.phase(), Phase::Results);
        assert_eq!(overlay.session().selected, Some(0));
        assert_eq!(overlay.selected_result().unwrap().id, "tt0133093");
        assert_eq!(overlay.status_line(), None);
    }

    #[test]
    fn test_empty_results() {
        let mut overlay = open_overlay();
        search(&mut overlay, "zzzz", SearchOutcome::Results(Vec::new()));
        assert_eq!(overlay.phase(), Phase::Results);
        assert_eq!(overlay.session().selected, None);
        assert_eq!(overlay.status_line().as_deref(), Some("No results"));

        assert_eq!(overlay.update(key("ArrowDown")), vec![Effect::ConsumeKey]);
        assert_eq!(overlay.update(key("Enter")), vec![Effect::ConsumeKey]);
        assert!(overlay.is_open());
    }

    #[test]
    fn test_api_error_shown_verbatim() {
        let mut overlay = open_overlay();
        search(&mut overlay, "zzzz", SearchOutcome::Failed("Movie not found!".into()));
        assert_eq!(overlay.phase(), Phase::Error);
        assert_eq!(overlay.status_line().as_deref(), Some("Movie not found!"));
    }

    #[test]
    fn test_transport_error_is_generic() {
        let mut overlay = open_overlay();
        let outcome = SearchOutcome::from(Err(RelayError::Timeout(Duration::from_secs(10))));
        search(&mut overlay, "Matrix", outcome);
        assert_eq!(overlay.phase(), Phase::Error);
        assert_eq!(overlay.status_line().as_deref(), Some(GENERIC_SEARCH_ERROR));
    }

    #[test]
    fn test_outcome_from_relay_result() {
        assert_eq!(
            SearchOutcome::from(Err(RelayError::Api("Invalid API key!".into()))),
            SearchOutcome::Failed("Invalid API key!".into())
        );
        assert!(matches!(
            SearchOutcome::from(Err(RelayError::Transport("connection refused".into()))),
            SearchOutcome::Unreachable(_)
        ));
    }

    #[test]
    fn test_stale_response_dropped() {
        let mut overlay = open_overlay();
        overlay.update(Message::QueryChanged("Matrix".into()));
        let a = overlay.seq();
        overlay.update(Message::DebounceElapsed { seq: a });
        overlay.update(Message::QueryChanged("Matrix Re".into()));
        let b = overlay.seq();
        overlay.update(Message::DebounceElapsed { seq: b });

        let reloaded = vec![result("tt0234215", "The Matrix Reloaded", Some(MediaKind::Movie))];
        overlay.update(Message::SearchFinished {
            seq: b,
            outcome: SearchOutcome::Results(reloaded.clone()),
        });
        let late = overlay.update(Message::SearchFinished {
            seq: a,
            outcome: SearchOutcome::Results(matrix_results()),
        });

        assert!(late.is_empty());
        assert_eq!(overlay.session().results, reloaded);
    }

    #[test]
    fn test_response_after_close_dropped() {
        let mut overlay = open_overlay();
        overlay.update(Message::QueryChanged("Matrix".into()));
        let seq = overlay.seq();
        overlay.update(Message::DebounceElapsed { seq });
        overlay.update(key("Escape"));

        let effects = overlay.update(Message::SearchFinished {
            seq,
            outcome: SearchOutcome::Results(matrix_results()),
        });
        assert!(effects.is_empty());
        assert_eq!(overlay.phase(), Phase::Closed);
        assert!(overlay.session().results.is_empty());
    }

    #[test]
    fn test_shortening_query_discards_pending_search() {
        let mut overlay = open_overlay();
        overlay.update(Message::QueryChanged("Ma".into()));
        let seq = overlay.seq();
        overlay.update(Message::QueryChanged("M".into()));
        assert!(overlay.update(Message::DebounceElapsed { seq }).is_empty());
        assert_eq!(overlay.phase(), Phase::Empty);
    }

    #[test]
    fn test_new_search_clears_previous_results() {
        let mut overlay = open_overlay();
        search(&mut overlay, "Matrix", SearchOutcome::Results(matrix_results()));
        overlay.update(Message::QueryChanged("Matrix R".into()));
        assert_eq!(overlay.phase(), Phase::Searching);
        assert!(overlay.session().results.is_empty());
        assert_eq!(overlay.session().selected, None);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut overlay = open_overlay();
        let three = vec![
            result("tt1", "One", Some(MediaKind::Movie)),
            result("tt2", "Two", Some(MediaKind::Movie)),
            result("tt3", "Three", Some(MediaKind::Movie)),
        ];
        search(&mut overlay, "Numbers", SearchOutcome::Results(three));

        overlay.update(key("ArrowUp"));
        assert_eq!(overlay.session().selected, Some(2));
        overlay.update(key("ArrowDown"));
        assert_eq!(overlay.session().selected, Some(0));
        overlay.update(key("ArrowDown"));
        overlay.update(key("ArrowDown"));
        overlay.update(key("ArrowDown"));
        assert_eq!(overlay.session().selected, Some(0));
    }

    #[test]
    fn test_navigation_from_no_selection() {
        let mut overlay = open_overlay();
        search(&mut overlay, "Matrix", SearchOutcome::Results(matrix_results()));
        overlay.session.selected = None;
        overlay.update(key("ArrowDown"));
        assert_eq!(overlay.session().selected, Some(0));

        overlay.session.selected = None;
        overlay.update(key("ArrowUp"));
        assert_eq!(overlay.session().selected, Some(1));
    }

    #[test]
    fn test_navigation_ignored_while_searching() {
        let mut overlay = open_overlay();
        overlay.update(Message::QueryChanged("Matrix".into()));
        assert_eq!(overlay.update(key("ArrowDown")), vec![Effect::ConsumeKey]);
        assert_eq!(overlay.session().selected, None);
    }

    #[test]
    fn test_enter_opens_selected_and_closes() {
        let mut overlay = open_overlay();
        search(&mut overlay, "Matrix", SearchOutcome::Results(matrix_results()));
        overlay.update(key("ArrowDown"));

        let effects = overlay.update(key("Enter"));
        assert_eq!(
            effects,
            vec![
                Effect::ConsumeKey,
                Effect::OpenEmbed {
                    id: "tt0234215".into(),
                    kind: MediaKind::Movie
                },
                Effect::CancelSearch,
                Effect::Hide,
            ]
        );
        assert_eq!(overlay.phase(), Phase::Closed);
        assert!(overlay.session().results.is_empty());
    }

    #[test]
    fn test_enter_opens_single_result_without_selection() {
        let mut overlay = open_overlay();
        let dark = vec![result("tt5753856", "Dark", Some(MediaKind::Series))];
        search(&mut overlay, "Dark", SearchOutcome::Results(dark));
        overlay.session.selected = None;

        let effects = overlay.update(key("Enter"));
        assert!(effects.contains(&Effect::OpenEmbed {
            id: "tt5753856".into(),
            kind: MediaKind::Series
        }));
    }

    #[test]
    fn test_enter_without_selection_among_many_is_noop() {
        let mut overlay = open_overlay();
        search(&mut overlay, "Matrix", SearchOutcome::Results(matrix_results()));
        overlay.session.selected = None;
        assert_eq!(overlay.update(key("Enter")), vec![Effect::ConsumeKey]);
        assert!(overlay.is_open());
    }

    #[test]
    fn test_unknown_kind_opens_as_movie() {
        let mut overlay = open_overlay();
        search(
            &mut overlay,
            "Halo",
            SearchOutcome::Results(vec![result("tt0250557", "Halo", None)]),
        );
        let effects = overlay.update(Message::RowClicked(0));
        assert_eq!(
            effects[0],
            Effect::OpenEmbed {
                id: "tt0250557".into(),
                kind: MediaKind::Movie
            }
        );
    }

    #[test]
    fn test_empty_id_is_silent_noop() {
        let mut overlay = open_overlay();
        search(
            &mut overlay,
            "Ghost",
            SearchOutcome::Results(vec![result("", "Ghost", Some(MediaKind::Movie))]),
        );
        assert!(overlay.update(Message::RowClicked(0)).is_empty());
        assert!(overlay.is_open());
    }

    #[test]
    fn test_hover_selects_without_other_changes() {
        let mut overlay = open_overlay();
        search(&mut overlay, "Matrix", SearchOutcome::Results(matrix_results()));

        assert_eq!(overlay.update(Message::RowHovered(1)), vec![Effect::Render]);
        assert_eq!(overlay.session().selected, Some(1));
        assert!(overlay.update(Message::RowHovered(1)).is_empty());
        assert!(overlay.update(Message::RowHovered(7)).is_empty());
        assert_eq!(overlay.phase(), Phase::Results);
    }

    #[test]
    fn test_click_activates_row() {
        let mut overlay = open_overlay();
        search(&mut overlay, "Matrix", SearchOutcome::Results(matrix_results()));
        let effects = overlay.update(Message::RowClicked(1));
        assert_eq!(effects[0], Effect::OpenEmbed {
            id: "tt0234215".into(),
            kind: MediaKind::Movie
        });
        assert!(!overlay.is_open());
    }

    #[test]
    fn test_backdrop_closes() {
        let mut overlay = open_overlay();
        overlay.update(Message::QueryChanged("Matrix".into()));
        let effects = overlay.update(Message::BackdropClicked);
        assert_eq!(effects, vec![Effect::CancelSearch, Effect::Hide]);
        assert_eq!(overlay.phase(), Phase::Closed);
        assert_eq!(overlay.session(), &OverlaySession::default());
    }

    #[test]
    fn test_close_when_closed_is_noop() {
        let mut overlay = Overlay::default();
        assert!(overlay.update(Message::Close).is_empty());
    }

    #[test]
    fn test_config_update_changes_shortcut() {
        let mut overlay = Overlay::default();
        overlay.update(Message::from(ContentMessage::ConfigUpdated {
            settings: ConfigBroadcast {
                shortcut: "Alt+Shift+K".into(),
            },
        }));
        assert_eq!(overlay.settings().shortcut.to_string(), "Alt+Shift+K");

        // The old shortcut no longer toggles.
        assert!(overlay.update(Message::Key(ctrl_space())).is_empty());

        let alt_shift_k = KeyEvent::new("K")
            .with_code("KeyK")
            .with_modifiers(Modifiers::ALT | Modifiers::SHIFT);
        overlay.update(Message::Key(alt_shift_k));
        assert!(overlay.is_open());
    }

    #[test]
    fn test_invalid_config_update_keeps_shortcut() {
        let mut overlay = Overlay::default();
        overlay.update(Message::ConfigUpdated(ConfigBroadcast {
            shortcut: "Ctrl+Shift".into(),
        }));
        assert_eq!(overlay.settings().shortcut, ShortcutSpec::default());
    }

    #[test]
    fn test_toggle_message_from_relay() {
        let mut overlay = Overlay::default();
        overlay.update(Message::from(ContentMessage::ToggleOverlay));
        assert!(overlay.is_open());
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = AppConfig::default();
        config.overlay.shortcut = "Meta+K".into();
        config.overlay.debounce_ms = 400;
        let settings = OverlaySettings::from_config(&config);
        assert_eq!(settings.shortcut.to_string(), "Meta+K");
        assert_eq!(settings.debounce, Duration::from_millis(400));

        config.overlay.shortcut = "Shift".into();
        assert_eq!(OverlaySettings::from_config(&config).shortcut, ShortcutSpec::default());
    }

    #[test]
    fn test_matrix_walkthrough() {
        let mut overlay = Overlay::default();
        overlay.update(Message::Key(ctrl_space()));
        assert_eq!(overlay.phase(), Phase::Empty);

        for query in ["M", "Ma", "Mat", "Matr", "Matri", "Matrix"] {
            overlay.update(Message::QueryChanged(query.into()));
        }
        let seq = overlay.seq();
        let dispatch = overlay.update(Message::DebounceElapsed { seq });
        assert_eq!(
            dispatch,
            vec![Effect::DispatchSearch {
                seq,
                query: "Matrix".into()
            }]
        );

        overlay.update(Message::SearchFinished {
            seq,
            outcome: SearchOutcome::Results(matrix_results()),
        });
        assert_eq!(overlay.session().selected, Some(0));
        let effects = overlay.update(key("Enter"));

        assert_eq!(
            effects,
            vec![
                Effect::ConsumeKey,
                Effect::OpenEmbed {
                    id: "tt0133093".into(),
                    kind: MediaKind::Movie
                },
                Effect::CancelSearch,
                Effect::Hide,
            ]
        );
        assert_eq!(overlay.phase(), Phase::Closed);
    }
}
