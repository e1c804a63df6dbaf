#![forbid(unsafe_code)]
#![doc = "Backend traits for Mosaic: platform abstraction for key input, display, and wall-clock time."]
#![doc = ""]
#![doc = "This crate defines the boundary between the overlay and platform-specific"]
#![doc = "implementations (a desktop window via `mosaic-window`, an in-memory surface"]
#![doc = "via `mosaic-harness`)."]

use core::time::Duration;

use chrono::{DateTime, Local};
use mosaic_core::event::KeyEvent;
use mosaic_render::Canvas;

/// Wall-clock abstraction.
///
/// Recording file names are derived from this clock; the overlay never calls
/// `Local::now()` directly.
pub trait BackendClock {
    /// Current local time.
    fn now_local(&self) -> DateTime<Local>;
}

/// Key input abstraction.
///
/// This is the input half of the backend boundary. The overlay polls it for
/// at most one key per frame.
pub trait KeySource {
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Return the next pressed key, or `None` if none arrives in `timeout`.
    ///
    /// Must not block longer than `timeout`.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, Self::Error>;
}

/// Display abstraction: a write-only sink for composited frames.
pub trait DisplaySink {
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Push `canvas` to the surface and make it visible.
    fn present(&mut self, canvas: &Canvas) -> Result<(), Self::Error>;

    /// Whether the surface can still show frames (e.g. the window was not closed).
    fn is_open(&self) -> bool {
        true
    }
}

/// Unified backend combining clock, key source, and display.
///
/// The `Overlay` is generic over this trait. Implementations:
/// - `mosaic-window`: a native window.
/// - `mosaic-harness`: a headless surface with scripted keys.
pub trait Backend {
    /// Shared by keys and display.
    type Error: core::fmt::Debug + core::fmt::Display;
    type Clock: BackendClock;
    type Keys: KeySource<Error = Self::Error>;
    type Display: DisplaySink<Error = Self::Error>;

    fn clock(&self) -> &Self::Clock;
    fn keys(&mut self) -> &mut Self::Keys;
    fn display(&mut self) -> &mut Self::Display;
}

/// [`BackendClock`] backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl BackendClock for SystemClock {
    fn now_local(&self) -> DateTime<Local> {
        Local::now()
    }
}
