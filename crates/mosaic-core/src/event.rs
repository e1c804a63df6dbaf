#![forbid(unsafe_code)]

//! Key events as the overlay sees them.
//!
//! Backends translate native keys (minifb key enums, scripted test input)
//! into [`KeyEvent`]. One key is consumed per refresh, so there are no mouse,
//! paste or resize events. Backends that cannot tell press from repeat report
//! [`KeyEventKind::Press`].

use bitflags::bitflags;

/// One key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    /// Modifiers held at the time of the transition.
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Unmodified press of `code`.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c))
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// True for `KeyCode::Char(c)`, whatever the modifiers.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        self.code == KeyCode::Char(c)
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Keys a backend can report. Anything else becomes [`KeyCode::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Printable key, already case-mapped by the backend.
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Space,
    /// `F(1)` through `F(24)`.
    F(u8),
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    /// Auto-repeat while held.
    Repeat,
    Release,
}

bitflags! {
    /// Held modifier keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const NONE  = 0;
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
        /// Command on macOS, Windows key elsewhere.
        const SUPER = 1 << 3;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_shorthand_matches_new() {
        let event = KeyEvent::new(KeyCode::Char('r'));
        assert!(event.is_char('r'));
        assert!(!event.is_char('q'));
        assert_eq!(event, KeyEvent::char('r'));
    }

    #[test]
    fn modifier_queries() {
        let event = KeyEvent::char('q').with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert!(event.ctrl());
        assert!(event.shift());
        assert!(!event.alt());
        assert!(event.is_char('q'));
    }

    #[test]
    fn kind_defaults_to_press() {
        let press = KeyEvent::new(KeyCode::Enter);
        assert_eq!(press.kind, KeyEventKind::Press);
        assert_eq!(press.with_kind(KeyEventKind::Release).kind, KeyEventKind::Release);
    }

    #[test]
    fn no_modifiers_by_default() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
        assert!(KeyEvent::char('x').modifiers.is_empty());
    }
}
