//! Keyboard dispatch for the settings editor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A pressed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character, compared case-insensitively.
    Char(char),
    /// The escape key.
    Escape,
    /// Any other key.
    Other,
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Control.
    pub ctrl: bool,
    /// Shift.
    pub shift: bool,
    /// Alt / Option.
    pub alt: bool,
    /// Meta / Command.
    pub meta: bool,
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key.
    pub key: Key,
    /// Held modifiers.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                ctrl: false,
                shift: false,
                alt: false,
                meta: false,
            },
        }
    }

    /// A key press with the given modifiers.
    #[must_use]
    pub const fn with(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

/// What a key press asks the host to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Open the settings editor.
    OpenSettings,
    /// Close the settings editor.
    CloseSettings,
    /// Nothing.
    None,
}

/// A key chord that opens the settings editor, written as `ctrl+shift+r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Shortcut {
    key: char,
    modifiers: Modifiers,
}

impl Default for Shortcut {
    fn default() -> Self {
        Self {
            key: 'r',
            modifiers: Modifiers {
                ctrl: true,
                shift: true,
                ..Modifiers::default()
            },
        }
    }
}

impl Shortcut {
    /// Returns `true` if `event` is this chord.
    #[must_use]
    pub fn matches(&self, event: &KeyEvent) -> bool {
        match event.key {
            Key::Char(c) => c.eq_ignore_ascii_case(&self.key) && event.modifiers == self.modifiers,
            Key::Escape | Key::Other => false,
        }
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Modifiers { ctrl, shift, alt, meta } = self.modifiers;
        for (held, name) in [(ctrl, "ctrl"), (shift, "shift"), (alt, "alt"), (meta, "meta")] {
            if held {
                write!(f, "{name}+")?;
            }
        }
        write!(f, "{}", self.key.to_ascii_lowercase())
    }
}

/// Error returned when a shortcut string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseShortcutError {
    input: String,
}

impl fmt::Display for ParseShortcutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid shortcut '{}': expected e.g. 'ctrl+shift+r'", self.input)
    }
}

impl std::error::Error for ParseShortcutError {}

impl FromStr for Shortcut {
    type Err = ParseShortcutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseShortcutError { input: s.to_owned() };
        let mut modifiers = Modifiers::default();
        let mut key = None;

        for part in s.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "shift" => modifiers.shift = true,
                "alt" | "option" => modifiers.alt = true,
                "meta" | "cmd" | "command" => modifiers.meta = true,
                other => {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next(), key) {
                        (Some(c), None, None) => key = Some(c),
                        _ => return Err(err()),
                    }
                }
            }
        }

        let key = key.ok_or_else(err)?;
        if modifiers == Modifiers::default() {
            return Err(err());
        }
        Ok(Self { key, modifiers })
    }
}

impl TryFrom<String> for Shortcut {
    type Error = ParseShortcutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Shortcut> for String {
    fn from(shortcut: Shortcut) -> Self {
        shortcut.to_string()
    }
}

/// Maps a key press to an action given whether the settings editor is open.
#[must_use]
pub fn dispatch_key(event: &KeyEvent, settings_open: bool, shortcut: &Shortcut) -> KeyAction {
    if settings_open && event.key == Key::Escape {
        return KeyAction::CloseSettings;
    }
    if !settings_open && shortcut.matches(event) {
        return KeyAction::OpenSettings;
    }
    KeyAction::None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctrl_shift(key: char) -> KeyEvent {
        KeyEvent::with(
            Key::Char(key),
            Modifiers {
                ctrl: true,
                shift: true,
                ..Modifiers::default()
            },
        )
    }

    #[test]
    fn default_shortcut_opens_settings() {
        let shortcut = Shortcut::default();
        assert_eq!(dispatch_key(&ctrl_shift('R'), false, &shortcut), KeyAction::OpenSettings);
    }

    #[test]
    fn shortcut_is_ignored_while_settings_open() {
        assert_eq!(dispatch_key(&ctrl_shift('r'), true, &Shortcut::default()), KeyAction::None);
    }

    #[test]
    fn escape_closes_only_when_open() {
        let escape = KeyEvent::plain(Key::Escape);
        assert_eq!(dispatch_key(&escape, true, &Shortcut::default()), KeyAction::CloseSettings);
        assert_eq!(dispatch_key(&escape, false, &Shortcut::default()), KeyAction::None);
    }

    #[test]
    fn extra_or_missing_modifiers_do_not_match() {
        let shortcut = Shortcut::default();
        assert!(!shortcut.matches(&KeyEvent::plain(Key::Char('r'))));

        let mut event = ctrl_shift('r');
        event.modifiers.alt = true;
        assert!(!shortcut.matches(&event));
    }

    #[test]
    fn shortcut_parses_and_displays() {
        let shortcut: Shortcut = "Alt + K".parse().unwrap();
        assert!(shortcut.matches(&KeyEvent::with(
            Key::Char('k'),
            Modifiers {
                alt: true,
                ..Modifiers::default()
            }
        )));
        assert_eq!(shortcut.to_string(), "alt+k");
        assert_eq!(Shortcut::default().to_string(), "ctrl+shift+r");
    }

    #[test]
    fn shortcut_rejects_bare_keys_and_multiple_keys() {
        assert!("r".parse::<Shortcut>().is_err());
        assert!("ctrl+a+b".parse::<Shortcut>().is_err());
        assert!("ctrl+".parse::<Shortcut>().is_err());
        assert!("ctrl+enter".parse::<Shortcut>().is_err());
    }
}
