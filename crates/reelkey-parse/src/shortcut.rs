//! Human-readable keyboard shortcuts.
//!
//! A [`ShortcutSpec`] is parsed once from a configuration string such as
//! `"Ctrl+Space"` or `"Alt+Shift+K"` and then matched against every keydown
//! the host forwards as a [`KeyEvent`].

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shortcut used when nothing (or nothing valid) is configured.
pub const DEFAULT_SHORTCUT: &str = "Ctrl+Space";

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const CTRL = 0b0001;
        const ALT = 0b0010;
        const SHIFT = 0b0100;
        const META = 0b1000;
    }
}

/// Modifier spellings accepted in shortcut strings (lowercase).
static MODIFIER_TOKENS: phf::Map<&'static str, Modifiers> = phf_map! {
    "ctrl" => Modifiers::CTRL,
    "control" => Modifiers::CTRL,
    "alt" => Modifiers::ALT,
    "option" => Modifiers::ALT,
    "shift" => Modifiers::SHIFT,
    "meta" => Modifiers::META,
    "cmd" => Modifiers::META,
    "command" => Modifiers::META,
    "super" => Modifiers::META,
    "win" => Modifiers::META,
};

/// Alternate key names folded onto one canonical token.
static KEY_ALIASES: phf::Map<&'static str, &'static str> = phf_map! {
    " " => "space",
    "spacebar" => "space",
    "esc" => "escape",
    "return" => "enter",
    "up" => "arrowup",
    "down" => "arrowdown",
    "left" => "arrowleft",
    "right" => "arrowright",
    "plus" => "+",
    "del" => "delete",
    "ins" => "insert",
    "pgup" => "pageup",
    "pgdn" => "pagedown",
};

/// Display labels for multi-word key tokens (DOM `KeyboardEvent.key` spelling).
static KEY_LABELS: phf::Map<&'static str, &'static str> = phf_map! {
    "arrowup" => "ArrowUp",
    "arrowdown" => "ArrowDown",
    "arrowleft" => "ArrowLeft",
    "arrowright" => "ArrowRight",
    "pageup" => "PageUp",
    "pagedown" => "PageDown",
    "backspace" => "Backspace",
    "capslock" => "CapsLock",
};

/// Reasons a shortcut string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortcutError {
    #[error("shortcut is empty")]
    Empty,

    /// Modifier-only shortcuts have no key to release, so they never fire reliably.
    #[error("shortcut {0:?} has no key, only modifiers")]
    MissingKey(String),
}

/// Fold a key name or `KeyboardEvent.key` value onto its canonical token.
pub fn normalize_key(raw: &str) -> String {
    let lower = raw.to_lowercase();
    match KEY_ALIASES.get(lower.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => lower,
    }
}

// ── Key events ────────────────────────────────────────────────────

/// A keydown as reported by the host page.
///
/// Field names follow the DOM `KeyboardEvent` so events can be deserialized
/// straight from a content script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Logical key (`"k"`, `" "`, `"Escape"`).
    pub key: String,
    /// Physical key code (`"KeyK"`, `"Space"`); may be empty.
    #[serde(default)]
    pub code: String,
    #[serde(default, rename = "ctrlKey")]
    pub ctrl: bool,
    #[serde(default, rename = "altKey")]
    pub alt: bool,
    #[serde(default, rename = "shiftKey")]
    pub shift: bool,
    #[serde(default, rename = "metaKey")]
    pub meta: bool,
}

impl KeyEvent {
    /// An unmodified press of `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.ctrl = modifiers.contains(Modifiers::CTRL);
        self.alt = modifiers.contains(Modifiers::ALT);
        self.shift = modifiers.contains(Modifiers::SHIFT);
        self.meta = modifiers.contains(Modifiers::META);
        self
    }

    /// The exact set of modifiers held.
    pub fn modifiers(&self) -> Modifiers {
        let mut m = Modifiers::empty();
        m.set(Modifiers::CTRL, self.ctrl);
        m.set(Modifiers::ALT, self.alt);
        m.set(Modifiers::SHIFT, self.shift);
        m.set(Modifiers::META, self.meta);
        m
    }

    /// Whether the logical key is `name`, ignoring case and aliases.
    pub fn is(&self, name: &str) -> bool {
        normalize_key(&self.key) == normalize_key(name)
    }

    /// Synthesize the keydown a shortcut describes.
    pub fn from_shortcut(spec: &ShortcutSpec) -> Self {
        let (key, code) = match spec.key.as_str() {
            "space" => (" ".to_string(), "Space".to_string()),
            k if k.chars().count() == 1 => {
                let c = k.chars().next().unwrap_or_default();
                let code = if c.is_ascii_alphabetic() {
                    format!("Key{}", c.to_ascii_uppercase())
                } else if c.is_ascii_digit() {
                    format!("Digit{c}")
                } else {
                    String::new()
                };
                (k.to_string(), code)
            }
            k => {
                let label = key_label(k);
                (label.clone(), label)
            }
        };
        Self::new(key).with_code(code).with_modifiers(spec.modifiers)
    }
}

// ── Shortcuts ─────────────────────────────────────────────────────

/// A parsed shortcut: an exact modifier set plus one normalized key token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortcutSpec {
    pub modifiers: Modifiers,
    pub key: String,
}

impl ShortcutSpec {
    /// Parse `"Ctrl+Shift+K"`-style input.
    ///
    /// Tokens are split on `+`, trimmed and compared case-insensitively.
    /// Every token that is not a modifier is a key candidate; the last one wins.
    /// A trailing `++` (or a lone `+`) names the plus key, same as `Plus`.
    pub fn parse(input: &str) -> Result<Self, ShortcutError> {
        let trimmed = input.trim();
        let normalized = match trimmed.strip_suffix("++") {
            Some(head) => format!("{head}+plus"),
            None if trimmed == "+" => "plus".to_string(),
            None => trimmed.to_string(),
        };
        let tokens: Vec<String> = normalized
            .split('+')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        if tokens.is_empty() {
            return Err(ShortcutError::Empty);
        }

        let mut modifiers = Modifiers::empty();
        let mut key = None;
        for token in &tokens {
            match MODIFIER_TOKENS.get(token.as_str()) {
                Some(m) => modifiers |= *m,
                None => key = Some(normalize_key(token)),
            }
        }

        let key = key.ok_or_else(|| ShortcutError::MissingKey(input.trim().to_string()))?;
        Ok(Self { modifiers, key })
    }

    pub fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    pub fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    pub fn meta(&self) -> bool {
        self.modifiers.contains(Modifiers::META)
    }

    /// Whether `event` triggers this shortcut.
    ///
    /// The modifier set must be identical; unrelated held modifiers reject the
    /// match. The key matches on the logical key or on the physical code
    /// (`KeyK`, `Digit1`, `Space`).
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.modifiers() != self.modifiers {
            return false;
        }
        if normalize_key(&event.key) == self.key {
            return true;
        }
        let code = event.code.to_lowercase();
        !code.is_empty()
            && (code == self.key
                || code == format!("key{}", self.key)
                || code == format!("digit{}", self.key))
    }
}

impl Default for ShortcutSpec {
    fn default() -> Self {
        Self {
            modifiers: Modifiers::CTRL,
            key: "space".into(),
        }
    }
}

fn key_label(key: &str) -> String {
    if let Some(label) = KEY_LABELS.get(key) {
        return (*label).to_string();
    }
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if chars.as_str().is_empty() => first.to_uppercase().collect(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for ShortcutSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, label) in [
            (Modifiers::CTRL, "Ctrl"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::META, "Meta"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{label}+")?;
            }
        }
        let key = if self.key == "+" { "Plus".to_string() } else { key_label(&self.key) };
        write!(f, "{key}")
    }
}

impl FromStr for ShortcutSpec {
    type Err = ShortcutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShortcutSpec {
    type Error = ShortcutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShortcutSpec> for String {
    fn from(spec: ShortcutSpec) -> Self {
        spec.to_string()
    }
}
