//! Terminal stand-ins for the browser surfaces: an overlay drawn as text and
//! a page loaded from a saved HTML file.

use std::io::Write;

use reelkey_core::injector::PageHost;
use reelkey_core::overlay::driver::OverlayView;
use reelkey_core::overlay::{Message, Overlay};
use reelkey_parse::{KeyEvent, PageMetadata, ShortcutSpec};

// ── Overlay view ──────────────────────────────────────────────────

pub struct TerminalView<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> OverlayView for TerminalView<W> {
    fn show(&mut self) {
        let _ = writeln!(self.out, "── search ──────────────────────────────");
    }

    fn hide(&mut self) {
        let _ = writeln!(self.out, "── closed ──────────────────────────────");
    }

    fn focus_input(&mut self) {}

    fn render(&mut self, overlay: &Overlay) {
        let session = overlay.session();
        let _ = writeln!(self.out, "query: {}", session.query);
        if let Some(status) = overlay.status_line() {
            let _ = writeln!(self.out, "  {status}");
            return;
        }
        for (i, row) in session.results.iter().enumerate() {
            let marker = if session.selected == Some(i) { '>' } else { ' ' };
            let year = row.year.as_deref().unwrap_or("—");
            let kind = row.media_type.as_deref().unwrap_or("");
            let _ = writeln!(self.out, "{marker} {i}. {} ({year}) {kind}", row.title);
        }
    }

    fn embed_opened(&mut self, id: &str, result: Result<&str, &str>) {
        let _ = match result {
            Ok(url) => writeln!(self.out, "opened {id}: {url}"),
            Err(e) => writeln!(self.out, "could not open {id}: {e}"),
        };
    }
}

/// One line of overlay input.
#[derive(Debug, PartialEq)]
pub enum Line {
    Send(Message),
    /// Ask the relay to toggle every overlay.
    Toggle,
    Quit,
    Invalid(String),
}

/// Plain text edits the query; `:`-prefixed lines are keys and commands.
pub fn parse_line(line: &str) -> Line {
    let Some(command) = line.strip_prefix(':') else {
        return Line::Send(Message::QueryChanged(line.to_string()));
    };
    let (name, arg) = match command.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (command.trim(), ""),
    };

    let key = |k: &str| Line::Send(Message::Key(KeyEvent::new(k)));
    let index = |arg: &str| arg.parse::<usize>().map_err(|_| format!("not a row number: {arg:?}"));

    match name {
        "down" => key("ArrowDown"),
        "up" => key("ArrowUp"),
        "enter" => key("Enter"),
        "esc" => key("Escape"),
        "open" => Line::Send(Message::Open),
        "toggle" => Line::Toggle,
        "quit" | "q" => Line::Quit,
        "hover" => match index(arg) {
            Ok(i) => Line::Send(Message::RowHovered(i)),
            Err(e) => Line::Invalid(e),
        },
        "click" => match index(arg) {
            Ok(i) => Line::Send(Message::RowClicked(i)),
            Err(e) => Line::Invalid(e),
        },
        "key" => match ShortcutSpec::parse(arg) {
            Ok(spec) => Line::Send(Message::Key(KeyEvent::from_shortcut(&spec))),
            Err(e) => Line::Invalid(e.to_string()),
        },
        other => Line::Invalid(format!("unknown command :{other}")),
    }
}

// ── Page host ─────────────────────────────────────────────────────

/// A page path plus its saved HTML. Controls are numbered.
pub struct FilePage {
    path: String,
    metadata: PageMetadata,
    attached: Vec<u32>,
    next: u32,
}

impl FilePage {
    pub fn new(path: impl Into<String>, html: Option<&str>) -> Self {
        Self {
            path: path.into(),
            metadata: html.map(PageMetadata::from_html).unwrap_or_default(),
            attached: Vec::new(),
            next: 0,
        }
    }
}

impl PageHost for FilePage {
    type Control = u32;

    fn path(&self) -> String {
        self.path.clone()
    }

    fn attach_control(&mut self, id: &str) -> u32 {
        self.next += 1;
        self.attached.push(self.next);
        tracing::debug!(id, control = self.next, "control attached");
        self.next
    }

    fn is_attached(&self, control: &u32) -> bool {
        self.attached.contains(control)
    }

    fn detach_control(&mut self, control: u32) {
        self.attached.retain(|c| *c != control);
    }

    fn metadata(&self) -> PageMetadata {
        self.metadata.clone()
    }
}
