use std::fmt;
use std::str::FromStr;

use crate::commands::{Command, Outcome};
use crate::error::KeymapError;
use crate::state::EditorState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// A key plus modifiers, parsed from strings such as `Shift-Ctrl-1` or `Mod-]`.
///
/// Modifier names are case-insensitive and `Mod` is the same as `Ctrl`. The
/// key name is case-insensitive too.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: String,
    pub modifiers: Modifiers,
}

impl FromStr for KeyChord {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A trailing "-" after a separator is the minus key itself.
        let (mods, key) = match s.strip_suffix("--") {
            Some(mods) => (mods, "-"),
            None if s == "-" => ("", "-"),
            None => s.rsplit_once('-').unwrap_or(("", s)),
        };
        if key.is_empty() {
            return Err(KeymapError::Empty);
        }

        let mut modifiers = Modifiers::default();
        for name in mods.split('-').filter(|m| !m.is_empty()) {
            match name.to_ascii_lowercase().as_str() {
                "shift" | "s" => modifiers.shift = true,
                "ctrl" | "control" | "c" | "mod" => modifiers.ctrl = true,
                "alt" | "option" | "a" => modifiers.alt = true,
                "meta" | "cmd" | "m" => modifiers.meta = true,
                _ => {
                    return Err(KeymapError::UnknownModifier {
                        modifier: name.to_string(),
                        chord: s.to_string(),
                    });
                }
            }
        }

        Ok(KeyChord {
            key: key.to_lowercase(),
            modifiers,
        })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.modifiers;
        for (on, name) in [(m.shift, "Shift"), (m.ctrl, "Ctrl"), (m.alt, "Alt"), (m.meta, "Meta")] {
            if on {
                write!(f, "{}-", name)?;
            }
        }
        write!(f, "{}", self.key)
    }
}

struct Binding {
    chord: KeyChord,
    command: Command,
}

/// Ordered chord bindings. Several commands may share a chord; the first one
/// that handles the event wins.
#[derive(Default)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, chord: &str, command: Command) -> Result<(), KeymapError> {
        let chord = chord.parse()?;
        self.bindings.push(Binding { chord, command });
        Ok(())
    }

    pub fn dispatch(&self, chord: &KeyChord, state: &EditorState) -> Outcome {
        for binding in self.bindings.iter().filter(|b| &b.chord == chord) {
            let outcome = (binding.command)(state);
            if outcome.is_handled() {
                tracing::trace!(chord = %chord, "key handled");
                return outcome;
            }
        }
        Outcome::Pass
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn chords(&self) -> impl Iterator<Item = &KeyChord> {
        self.bindings.iter().map(|b| &b.chord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(s: &str) -> KeyChord {
        s.parse().unwrap()
    }

    #[test]
    fn modifiers_are_case_insensitive() {
        assert_eq!(chord("Shift-ctrl-o"), chord("shift-Ctrl-O"));
        assert_eq!(chord("Mod-]"), chord("Ctrl-]"));
        assert_eq!(chord("Shift-Ctrl-1").to_string(), "Shift-Ctrl-1");
    }

    #[test]
    fn minus_key() {
        assert_eq!(chord("Ctrl--").key, "-");
        assert!(chord("Ctrl--").modifiers.ctrl);
        assert_eq!(chord("-").key, "-");
    }

    #[test]
    fn rejects_unknown_modifiers() {
        assert_eq!(
            "Hyper-a".parse::<KeyChord>(),
            Err(KeymapError::UnknownModifier {
                modifier: "Hyper".to_string(),
                chord: "Hyper-a".to_string(),
            })
        );
        assert_eq!("".parse::<KeyChord>(), Err(KeymapError::Empty));
    }
}
