#![forbid(unsafe_code)]

//! In-memory backend for deterministic overlay tests.
//!
//! ```
//! use mosaic_backend::{Backend, KeySource};
//! use mosaic_harness::{HeadlessBackend, ScriptedKeys};
//! use std::time::Duration;
//!
//! let mut backend = HeadlessBackend::new().with_keys(ScriptedKeys::from_script("r.q"));
//! let t = Duration::ZERO;
//! assert!(backend.keys().poll_key(t).unwrap().unwrap().is_char('r'));
//! assert!(backend.keys().poll_key(t).unwrap().is_none());
//! assert!(backend.keys().poll_key(t).unwrap().unwrap().is_char('q'));
//! ```

use std::cell::Cell;
use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, TimeZone};
use mosaic_backend::{Backend, BackendClock, DisplaySink, KeySource};
use mosaic_core::event::KeyEvent;
use mosaic_render::Canvas;
use thiserror::Error;

use crate::checksum::canvas_checksum;

/// Errors raised by the headless backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeadlessError {
    /// A failure queued with `fail_next_*`.
    #[error("injected {0} failure")]
    Injected(&'static str),
    #[error("display is closed")]
    Closed,
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Clock that advances by a fixed step on every read.
#[derive(Debug, Clone)]
pub struct SteppingClock {
    start: DateTime<Local>,
    step: TimeDelta,
    reads: Cell<i32>,
}

impl Default for SteppingClock {
    /// 2026-01-01 00:00:00 local, one second per read.
    fn default() -> Self {
        let start = Local
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .earliest()
            .unwrap_or_else(Local::now);
        Self::new(start, TimeDelta::seconds(1))
    }
}

impl SteppingClock {
    #[must_use]
    pub fn new(start: DateTime<Local>, step: TimeDelta) -> Self {
        Self {
            start,
            step,
            reads: Cell::new(0),
        }
    }

    /// Number of times the clock was read.
    pub fn reads(&self) -> i32 {
        self.reads.get()
    }
}

impl BackendClock for SteppingClock {
    fn now_local(&self) -> DateTime<Local> {
        let n = self.reads.get();
        self.reads.set(n.saturating_add(1));
        self.start + self.step * n
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Key source that replays a fixed script, one slot per poll.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    slots: VecDeque<Option<KeyEvent>>,
    polls: usize,
    fail_next: bool,
}

impl ScriptedKeys {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One slot per character; `.` is a poll that sees no key.
    #[must_use]
    pub fn from_script(script: &str) -> Self {
        let mut keys = Self::new();
        for c in script.chars() {
            if c == '.' {
                keys.push_idle();
            } else {
                keys.push_key(KeyEvent::char(c));
            }
        }
        keys
    }

    pub fn push_key(&mut self, key: KeyEvent) -> &mut Self {
        self.slots.push_back(Some(key));
        self
    }

    pub fn push_char(&mut self, c: char) -> &mut Self {
        self.push_key(KeyEvent::char(c))
    }

    pub fn push_idle(&mut self) -> &mut Self {
        self.slots.push_back(None);
        self
    }

    /// Make the next poll fail.
    pub fn fail_next_poll(&mut self) {
        self.fail_next = true;
    }

    /// Number of polls served, including idle and failed ones.
    pub fn polls(&self) -> usize {
        self.polls
    }

    /// Slots not yet consumed.
    pub fn remaining(&self) -> usize {
        self.slots.len()
    }
}

impl KeySource for ScriptedKeys {
    type Error = HeadlessError;

    fn poll_key(&mut self, _timeout: Duration) -> Result<Option<KeyEvent>, Self::Error> {
        self.polls += 1;
        if std::mem::take(&mut self.fail_next) {
            return Err(HeadlessError::Injected("poll"));
        }
        Ok(self.slots.pop_front().flatten())
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Display that keeps the last frame and a checksum of every frame.
#[derive(Debug, Clone)]
pub struct HeadlessDisplay {
    last: Option<Canvas>,
    checksums: Vec<String>,
    open: bool,
    fail_next: bool,
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        Self {
            last: None,
            checksums: Vec::new(),
            open: true,
            fail_next: false,
        }
    }
}

impl HeadlessDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames successfully presented.
    pub fn frame_count(&self) -> usize {
        self.checksums.len()
    }

    pub fn last_frame(&self) -> Option<&Canvas> {
        self.last.as_ref()
    }

    /// Checksum of every presented frame, in order.
    pub fn checksums(&self) -> &[String] {
        &self.checksums
    }

    /// Simulate the user closing the window.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn fail_next_present(&mut self) {
        self.fail_next = true;
    }
}

impl DisplaySink for HeadlessDisplay {
    type Error = HeadlessError;

    fn present(&mut self, canvas: &Canvas) -> Result<(), Self::Error> {
        if !self.open {
            return Err(HeadlessError::Closed);
        }
        if std::mem::take(&mut self.fail_next) {
            return Err(HeadlessError::Injected("present"));
        }
        let checksum = canvas_checksum(canvas);
        tracing::trace!(frame = self.checksums.len(), %checksum, "headless present");
        self.checksums.push(checksum);
        match &mut self.last {
            Some(last) if last.size() == canvas.size() => last.clone_from(canvas),
            slot => *slot = Some(canvas.clone()),
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Headless [`Backend`]: stepping clock, scripted keys, in-memory display.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    pub clock: SteppingClock,
    pub keys: ScriptedKeys,
    pub display: HeadlessDisplay,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_keys(mut self, keys: ScriptedKeys) -> Self {
        self.keys = keys;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: SteppingClock) -> Self {
        self.clock = clock;
        self
    }
}

impl Backend for HeadlessBackend {
    type Error = HeadlessError;
    type Clock = SteppingClock;
    type Keys = ScriptedKeys;
    type Display = HeadlessDisplay;

    fn clock(&self) -> &Self::Clock {
        &self.clock
    }

    fn keys(&mut self) -> &mut Self::Keys {
        &mut self.keys
    }

    fn display(&mut self) -> &mut Self::Display {
        &mut self.display
    }
}
