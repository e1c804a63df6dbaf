#![forbid(unsafe_code)]

//! Recording commands decoded from polled keys.
//!
//! Exactly one key is consumed per refresh. `r` starts a recording and `q`
//! stops it; every other key, and any non-press event, maps to nothing.

use crate::event::{KeyCode, KeyEvent, KeyEventKind};

/// Key that starts a recording.
pub const START_KEY: char = 'r';

/// Key that stops a recording.
pub const STOP_KEY: char = 'q';

/// A command for the recorder state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordCommand {
    /// Open a new output if idle.
    Start,
    /// Finalize the current output if recording.
    Stop,
}

impl RecordCommand {
    /// Map a raw character code to a command.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            START_KEY => Some(Self::Start),
            STOP_KEY => Some(Self::Stop),
            _ => None,
        }
    }

    /// Map a key event to a command.
    ///
    /// Modifier chords (Ctrl+R, Alt+Q) and releases are ignored.
    #[must_use]
    pub fn from_key(event: &KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release || event.ctrl() || event.alt() {
            return None;
        }
        match event.code {
            KeyCode::Char(c) => Self::from_char(c),
            _ => None,
        }
    }

    /// Stable label for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

impl std::fmt::Display for RecordCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
