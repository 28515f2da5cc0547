//! Key bindings for keyboard-driven table interaction.
//!
//! A [`Binding`] groups the key presses that trigger one action together with
//! the help text shown for it. Components expose their bindings through the
//! [`KeyMap`] trait so a help view can list them.

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A single key press: a key code plus the modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifiers that must be held.
    pub modifiers: KeyModifiers,
}

impl From<KeyCode> for KeyPress {
    fn from(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }
}

impl From<(KeyCode, KeyModifiers)> for KeyPress {
    fn from((code, modifiers): (KeyCode, KeyModifiers)) -> Self {
        Self { code, modifiers }
    }
}

impl From<char> for KeyPress {
    fn from(c: char) -> Self {
        KeyCode::Char(c).into()
    }
}

/// Help text for a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// Short key label, e.g. `"→/l"`.
    pub key: String,
    /// What the binding does.
    pub desc: String,
}

/// A set of key presses bound to one action.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help: Help,
    disabled: bool,
}

impl Binding {
    /// Creates a binding from anything convertible into key presses.
    ///
    /// ```rust
    /// use bubbletea_datatable::key::Binding;
    /// use crossterm::event::KeyCode;
    ///
    /// let next = Binding::new(vec![KeyCode::Right, KeyCode::Char('l')]).with_help("→/l", "next page");
    /// assert_eq!(next.help().desc, "next page");
    /// ```
    pub fn new<K: Into<KeyPress>>(keys: Vec<K>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            help: Help::default(),
            disabled: false,
        }
    }

    /// Attaches help text.
    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
        self
    }

    /// Returns the help text.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// Returns the bound key presses.
    pub fn keys(&self) -> &[KeyPress] {
        &self.keys
    }

    /// Enables or disables the binding. Disabled bindings never match.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    /// Whether the binding currently participates in matching.
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.keys.is_empty()
    }

    /// Reports whether `msg` triggers this binding.
    ///
    /// Plain character keys also match when only SHIFT is held, since the
    /// terminal already folds shift into the character.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        if !self.enabled() {
            return false;
        }
        self.keys.iter().any(|press| {
            press.code == msg.key
                && (press.modifiers == msg.modifiers
                    || (matches!(press.code, KeyCode::Char(_))
                        && press.modifiers == KeyModifiers::NONE
                        && msg.modifiers == KeyModifiers::SHIFT))
        })
    }
}

/// Implemented by components that publish their key bindings for help views.
pub trait KeyMap {
    /// Bindings shown in the compact help line.
    fn short_help(&self) -> Vec<&Binding>;
    /// Bindings grouped into columns for the expanded help view.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyMsg {
        KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_binding_matches_any_key() {
        let binding = Binding::new(vec![KeyCode::PageDown, KeyCode::Char('l')]);
        assert!(binding.matches(&key(KeyCode::PageDown)));
        assert!(binding.matches(&key(KeyCode::Char('l'))));
        assert!(!binding.matches(&key(KeyCode::Char('h'))));
    }

    #[test]
    fn test_disabled_binding_never_matches() {
        let mut binding = Binding::new(vec![KeyCode::Enter]);
        binding.set_enabled(false);
        assert!(!binding.matches(&key(KeyCode::Enter)));
        binding.set_enabled(true);
        assert!(binding.matches(&key(KeyCode::Enter)));
    }

    #[test]
    fn test_modifiers_must_match() {
        let binding = Binding::new(vec![(KeyCode::Char('s'), KeyModifiers::CONTROL)]);
        assert!(!binding.matches(&key(KeyCode::Char('s'))));
        assert!(binding.matches(&KeyMsg {
            key: KeyCode::Char('s'),
            modifiers: KeyModifiers::CONTROL,
        }));
    }

    #[test]
    fn test_shifted_character_matches_plain_binding() {
        let binding = Binding::new(vec!['G']);
        assert!(binding.matches(&KeyMsg {
            key: KeyCode::Char('G'),
            modifiers: KeyModifiers::SHIFT,
        }));
    }
}
