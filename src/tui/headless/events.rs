//! Event script parser for headless mode.
//!
//! A script is a list of `kind:value` steps separated by commas or newlines,
//! e.g. `type:SELECT 1,key:ctrl+r,wait:idle,assert:contains:1 row returned`.
//! Lines starting with `#` are comments.

use crate::error::{DeskError, Result};
use crate::tui::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::time::Duration;

/// A check against the rendered screen or the app state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assertion {
    /// Screen contains text (case-insensitive).
    Contains(String),
    /// Screen contains text (case-sensitive).
    ContainsExact(String),
    /// Screen does not contain text (case-insensitive).
    NotContains(String),
    /// Screen matches a regex.
    Matches(String),
    /// A state field compared with `=`, `>=`, `<=`, `>` or `<`.
    State {
        field: String,
        op: String,
        value: String,
    },
}

impl Assertion {
    /// Evaluates the assertion.
    pub fn check(&self, screen: &str, app: &App) -> bool {
        match self {
            Self::Contains(text) => screen.to_lowercase().contains(&text.to_lowercase()),
            Self::ContainsExact(text) => screen.contains(text.as_str()),
            Self::NotContains(text) => !screen.to_lowercase().contains(&text.to_lowercase()),
            Self::Matches(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(screen))
                .unwrap_or(false),
            Self::State { field, op, value } => {
                compare_values(app.state_field(field).as_deref(), op, value)
            }
        }
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains(t) => write!(f, "contains:{t}"),
            Self::ContainsExact(t) => write!(f, "contains-exact:{t}"),
            Self::NotContains(t) => write!(f, "not-contains:{t}"),
            Self::Matches(p) => write!(f, "matches:{p}"),
            Self::State { field, op, value } => write!(f, "state:{field}{op}{value}"),
        }
    }
}

/// Numeric comparison when both sides parse as integers, otherwise string
/// equality (only `=` applies to strings).
fn compare_values(actual: Option<&str>, op: &str, expected: &str) -> bool {
    let Some(actual) = actual else {
        return false;
    };

    if let (Ok(a), Ok(e)) = (actual.parse::<i64>(), expected.parse::<i64>()) {
        return match op {
            ">=" => a >= e,
            "<=" => a <= e,
            ">" => a > e,
            "<" => a < e,
            "=" => a == e,
            _ => false,
        };
    }

    op == "=" && actual == expected
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Types text into the focused input, one char at a time.
    Type(String),
    Wait(Duration),
    /// Waits until no request is in flight.
    WaitIdle,
    Resize(u16, u16),
    Snapshot(String),
    Assert(Assertion),
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => {
                let mut parts = Vec::new();
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    parts.push("ctrl".to_string());
                }
                if key.modifiers.contains(KeyModifiers::ALT) {
                    parts.push("alt".to_string());
                }
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    parts.push("shift".to_string());
                }
                parts.push(key_name(&key.code));
                write!(f, "key:{}", parts.join("+"))
            }
            Self::Type(text) => write!(f, "type:{text}"),
            Self::Wait(d) => write!(f, "wait:{}ms", d.as_millis()),
            Self::WaitIdle => write!(f, "wait:idle"),
            Self::Resize(w, h) => write!(f, "resize:{w}x{h}"),
            Self::Snapshot(name) => write!(f, "snapshot:{name}"),
            Self::Assert(a) => write!(f, "assert:{a}"),
        }
    }
}

const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("enter", KeyCode::Enter),
    ("esc", KeyCode::Esc),
    ("tab", KeyCode::Tab),
    ("backtab", KeyCode::BackTab),
    ("backspace", KeyCode::Backspace),
    ("delete", KeyCode::Delete),
    ("up", KeyCode::Up),
    ("down", KeyCode::Down),
    ("left", KeyCode::Left),
    ("right", KeyCode::Right),
    ("home", KeyCode::Home),
    ("end", KeyCode::End),
    ("pageup", KeyCode::PageUp),
    ("pagedown", KeyCode::PageDown),
    ("space", KeyCode::Char(' ')),
];

const KEY_ALIASES: &[(&str, &str)] = &[
    ("return", "enter"),
    ("escape", "esc"),
    ("bs", "backspace"),
    ("del", "delete"),
    ("pgup", "pageup"),
    ("pgdn", "pagedown"),
];

fn key_name(code: &KeyCode) -> String {
    if let Some((name, _)) = NAMED_KEYS.iter().find(|(_, c)| c == code) {
        return name.to_string();
    }
    match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::F(n) => format!("f{n}"),
        _ => "unknown".to_string(),
    }
}

/// Parser for the event script.
#[derive(Debug, Default)]
pub struct EventParser;

impl EventParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a whole script.
    pub fn parse_all(&self, input: &str) -> Result<Vec<Event>> {
        input
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .flat_map(|line| line.split(','))
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| self.parse_one(part))
            .collect()
    }

    /// Parses a single `kind:value` step.
    pub fn parse_one(&self, input: &str) -> Result<Event> {
        let input = input.trim();
        let Some((kind, value)) = input.split_once(':') else {
            return Err(DeskError::config(format!(
                "Invalid event syntax: '{input}'. Expected format: type:value"
            )));
        };

        match kind.trim().to_lowercase().as_str() {
            "key" => self.parse_key(value.trim()),
            "type" => Ok(Event::Type(value.to_string())),
            "wait" => self.parse_wait(value.trim()),
            "resize" => self.parse_resize(value.trim()),
            "snapshot" => Ok(Event::Snapshot(value.trim().to_string())),
            "assert" => self.parse_assert(value.trim()).map(Event::Assert),
            other => Err(DeskError::config(format!(
                "Unknown event type: '{other}'. Valid types: key, type, wait, resize, snapshot, assert"
            ))),
        }
    }

    /// Parses keys like `enter`, `ctrl+r`, `alt+1`, `shift+enter`, `f5`.
    fn parse_key(&self, value: &str) -> Result<Event> {
        let (modifier_names, key) = value.rsplit_once('+').unwrap_or(("", value));

        let mut modifiers = KeyModifiers::empty();
        for name in modifier_names.split('+').filter(|m| !m.is_empty()) {
            modifiers |= match name.to_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => {
                    return Err(DeskError::config(format!(
                        "Unknown modifier: '{name}'. Valid modifiers: ctrl, alt, shift"
                    )));
                }
            };
        }

        Ok(Event::Key(KeyEvent::new(self.parse_key_code(key)?, modifiers)))
    }

    fn parse_key_code(&self, s: &str) -> Result<KeyCode> {
        let lower = s.to_lowercase();
        let name = KEY_ALIASES
            .iter()
            .find(|(alias, _)| *alias == lower)
            .map_or(lower.as_str(), |(_, name)| *name);

        if let Some((_, code)) = NAMED_KEYS.iter().find(|(n, _)| *n == name) {
            return Ok(*code);
        }

        if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            if (1..=12).contains(&n) {
                return Ok(KeyCode::F(n));
            }
        }

        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(KeyCode::Char(c)),
            _ => Err(DeskError::config(format!(
                "Unknown key: '{s}'. Use single characters or named keys like enter, esc, tab"
            ))),
        }
    }

    /// Parses `idle`, `100ms`, `2s`, or a bare number of milliseconds.
    fn parse_wait(&self, value: &str) -> Result<Event> {
        let value = value.to_lowercase();
        if value == "idle" {
            return Ok(Event::WaitIdle);
        }

        let invalid = || DeskError::config(format!("Invalid duration: '{value}'"));
        let duration = if let Some(ms) = value.strip_suffix("ms") {
            Duration::from_millis(ms.parse().map_err(|_| invalid())?)
        } else if let Some(secs) = value.strip_suffix('s') {
            Duration::from_secs(secs.parse().map_err(|_| invalid())?)
        } else {
            Duration::from_millis(value.parse().map_err(|_| invalid())?)
        };
        Ok(Event::Wait(duration))
    }

    /// Parses `WIDTHxHEIGHT`.
    fn parse_resize(&self, value: &str) -> Result<Event> {
        let (w, h) = parse_size(value)?;
        Ok(Event::Resize(w, h))
    }

    /// Parses `contains:text`, `state:field=value`, etc.
    fn parse_assert(&self, value: &str) -> Result<Assertion> {
        let Some((kind, rest)) = value.split_once(':') else {
            return Err(DeskError::config(format!(
                "Invalid assertion syntax: '{value}'. Expected assert:type:value"
            )));
        };
        let rest = rest.trim().to_string();

        match kind.trim().to_lowercase().as_str() {
            "contains" => Ok(Assertion::Contains(rest)),
            "contains-exact" => Ok(Assertion::ContainsExact(rest)),
            "not-contains" => Ok(Assertion::NotContains(rest)),
            "matches" => Ok(Assertion::Matches(rest)),
            "state" => self.parse_state_assertion(&rest),
            other => Err(DeskError::config(format!(
                "Unknown assertion type: '{other}'. Valid types: contains, contains-exact, not-contains, matches, state"
            ))),
        }
    }

    fn parse_state_assertion(&self, value: &str) -> Result<Assertion> {
        // Two-char operators first so `>=` is not read as `>`.
        for op in [">=", "<=", ">", "<", "="] {
            if let Some((field, expected)) = value.split_once(op) {
                return Ok(Assertion::State {
                    field: field.trim().to_string(),
                    op: op.to_string(),
                    value: expected.trim().to_string(),
                });
            }
        }

        Err(DeskError::config(format!(
            "Invalid state assertion: '{value}'. Expected field=value or field>=value"
        )))
    }
}

/// Parses a `WIDTHxHEIGHT` screen size.
pub fn parse_size(value: &str) -> Result<(u16, u16)> {
    let Some((w, h)) = value.split_once('x') else {
        return Err(DeskError::config(format!(
            "Invalid size format: '{value}'. Expected WIDTHxHEIGHT (e.g., 80x24)"
        )));
    };
    let width = w
        .trim()
        .parse::<u16>()
        .map_err(|_| DeskError::config(format!("Invalid width: '{w}'")))?;
    let height = h
        .trim()
        .parse::<u16>()
        .map_err(|_| DeskError::config(format!("Invalid height: '{h}'")))?;
    Ok((width, height))
}
