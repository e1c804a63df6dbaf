#![forbid(unsafe_code)]

//! Native window backend.
//!
//! One [`WindowSurface`] is both the key source and the display: minifb
//! only processes input while the window is being updated, so both halves
//! share the window handle.
//!
//! Keys are polled with [`KeyRepeat::No`], so holding `r` produces one
//! start command rather than one per frame.

use std::collections::VecDeque;
use std::time::Duration;

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use mosaic_backend::{Backend, DisplaySink, KeySource, SystemClock};
use mosaic_core::event::{KeyCode, KeyEvent, Modifiers};
use mosaic_render::Canvas;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("window: {0}")]
    Window(#[from] minifb::Error),
    #[error("window was closed")]
    Closed,
    #[error("canvas is {actual_width}x{actual_height} but window is {width}x{height}")]
    SizeMismatch {
        width: usize,
        height: usize,
        actual_width: u32,
        actual_height: u32,
    },
}

/// A minifb window that shows canvases and reports pressed keys.
pub struct WindowSurface {
    window: Window,
    width: usize,
    height: usize,
    frame: Vec<u32>,
    pending: VecDeque<KeyEvent>,
}

impl std::fmt::Debug for WindowSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl WindowSurface {
    /// Open a non-resizable window sized to the canvas.
    pub fn open(title: &str, width: u32, height: u32) -> Result<Self, WindowError> {
        let (width, height) = (width as usize, height as usize);
        let window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;
        tracing::debug!(title, width, height, "window opened");
        Ok(Self {
            window,
            width,
            height,
            frame: Vec::with_capacity(width * height),
            pending: VecDeque::new(),
        })
    }

    /// Cap how often minifb repaints; 0 disables the limit.
    pub fn set_target_fps(&mut self, fps: usize) {
        self.window.set_target_fps(fps);
    }

    fn modifiers(&self) -> Modifiers {
        let down = |a, b| self.window.is_key_down(a) || self.window.is_key_down(b);
        let mut mods = Modifiers::NONE;
        if down(Key::LeftShift, Key::RightShift) {
            mods |= Modifiers::SHIFT;
        }
        if down(Key::LeftCtrl, Key::RightCtrl) {
            mods |= Modifiers::CTRL;
        }
        if down(Key::LeftAlt, Key::RightAlt) {
            mods |= Modifiers::ALT;
        }
        if down(Key::LeftSuper, Key::RightSuper) {
            mods |= Modifiers::SUPER;
        }
        mods
    }

    fn collect_keys(&mut self) {
        let mods = self.modifiers();
        for key in self.window.get_keys_pressed(KeyRepeat::No) {
            if let Some(event) = map_key(key, mods) {
                self.pending.push_back(event);
            }
        }
    }
}

impl KeySource for WindowSurface {
    type Error = WindowError;

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, Self::Error> {
        if !self.window.is_open() {
            return Err(WindowError::Closed);
        }
        if self.pending.is_empty() {
            self.window.update();
            self.collect_keys();
        }
        if self.pending.is_empty() && !timeout.is_zero() {
            std::thread::sleep(timeout);
            self.window.update();
            self.collect_keys();
        }
        Ok(self.pending.pop_front())
    }
}

impl DisplaySink for WindowSurface {
    type Error = WindowError;

    fn present(&mut self, canvas: &Canvas) -> Result<(), Self::Error> {
        if !self.window.is_open() {
            return Err(WindowError::Closed);
        }
        if canvas.width() as usize != self.width || canvas.height() as usize != self.height {
            return Err(WindowError::SizeMismatch {
                width: self.width,
                height: self.height,
                actual_width: canvas.width(),
                actual_height: canvas.height(),
            });
        }
        canvas.write_packed_0rgb(&mut self.frame);
        self.window
            .update_with_buffer(&self.frame, self.width, self.height)?;
        self.collect_keys();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.window.is_open()
    }
}

/// [`Backend`] over a native window and the system clock.
#[derive(Debug)]
pub struct WindowBackend {
    clock: SystemClock,
    surface: WindowSurface,
}

impl WindowBackend {
    pub fn open(title: &str, width: u32, height: u32) -> Result<Self, WindowError> {
        Ok(Self {
            clock: SystemClock,
            surface: WindowSurface::open(title, width, height)?,
        })
    }

    pub fn surface_mut(&mut self) -> &mut WindowSurface {
        &mut self.surface
    }
}

impl Backend for WindowBackend {
    type Error = WindowError;
    type Clock = SystemClock;
    type Keys = WindowSurface;
    type Display = WindowSurface;

    fn clock(&self) -> &Self::Clock {
        &self.clock
    }

    fn keys(&mut self) -> &mut Self::Keys {
        &mut self.surface
    }

    fn display(&mut self) -> &mut Self::Display {
        &mut self.surface
    }
}

/// Translate a minifb key into a [`KeyEvent`]. Modifier keys alone map to `None`.
pub fn map_key(key: Key, mods: Modifiers) -> Option<KeyEvent> {
    const LETTERS: [Key; 26] = [
        Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
        Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
        Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
    ];
    const DIGITS: [Key; 10] = [
        Key::Key0, Key::Key1, Key::Key2, Key::Key3, Key::Key4,
        Key::Key5, Key::Key6, Key::Key7, Key::Key8, Key::Key9,
    ];
    const FUNCTION: [Key; 12] = [
        Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6,
        Key::F7, Key::F8, Key::F9, Key::F10, Key::F11, Key::F12,
    ];

    let code = if let Some(i) = LETTERS.iter().position(|&k| k == key) {
        let c = char::from(b'a' + i as u8);
        KeyCode::Char(if mods.contains(Modifiers::SHIFT) {
            c.to_ascii_uppercase()
        } else {
            c
        })
    } else if let Some(i) = DIGITS.iter().position(|&k| k == key) {
        KeyCode::Char(char::from(b'0' + i as u8))
    } else if let Some(i) = FUNCTION.iter().position(|&k| k == key) {
        KeyCode::F(i as u8 + 1)
    } else {
        match key {
            Key::Space => KeyCode::Space,
            Key::Enter | Key::NumPadEnter => KeyCode::Enter,
            Key::Escape => KeyCode::Escape,
            Key::Backspace => KeyCode::Backspace,
            Key::Tab => KeyCode::Tab,
            Key::LeftShift
            | Key::RightShift
            | Key::LeftCtrl
            | Key::RightCtrl
            | Key::LeftAlt
            | Key::RightAlt
            | Key::LeftSuper
            | Key::RightSuper => return None,
            _ => KeyCode::Unknown,
        }
    };
    Some(KeyEvent::new(code).with_modifiers(mods))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::command::RecordCommand;

    #[test]
    fn letters_map_to_lowercase_chars() {
        let event = map_key(Key::R, Modifiers::NONE).unwrap();
        assert_eq!(event.code, KeyCode::Char('r'));
        assert_eq!(RecordCommand::from_key(&event), Some(RecordCommand::Start));
        let q = map_key(Key::Q, Modifiers::NONE).unwrap();
        assert_eq!(RecordCommand::from_key(&q), Some(RecordCommand::Stop));
    }

    #[test]
    fn shift_uppercases_letters() {
        let event = map_key(Key::R, Modifiers::SHIFT).unwrap();
        assert_eq!(event.code, KeyCode::Char('R'));
        assert!(event.shift());
    }

    #[test]
    fn digits_and_function_keys() {
        assert_eq!(map_key(Key::Key7, Modifiers::NONE).unwrap().code, KeyCode::Char('7'));
        assert_eq!(map_key(Key::F12, Modifiers::NONE).unwrap().code, KeyCode::F(12));
        assert_eq!(map_key(Key::Escape, Modifiers::NONE).unwrap().code, KeyCode::Escape);
    }

    #[test]
    fn bare_modifiers_are_dropped() {
        assert!(map_key(Key::LeftShift, Modifiers::SHIFT).is_none());
        assert!(map_key(Key::RightCtrl, Modifiers::CTRL).is_none());
    }

    #[test]
    fn ctrl_chord_is_not_a_command() {
        let event = map_key(Key::Q, Modifiers::CTRL).unwrap();
        assert_eq!(RecordCommand::from_key(&event), None);
    }
}
