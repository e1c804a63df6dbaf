#![forbid(unsafe_code)]

//! Frame recording.
//!
//! A [`Recorder`] is a two-state machine (`Idle` / `Recording`). Starting it
//! opens `<output_dir>/<prefix>-<timestamp>.avi`; every appended canvas is
//! JPEG-encoded into one `00dc` chunk of a RIFF AVI file; stopping writes the
//! `idx1` index and patches the header counters.
//!
//! The container code lives in [`avi`] and works on any `Write + Seek`, so
//! tests can record into memory and parse the result back with
//! [`avi::AviFile`].

pub mod avi;
mod config;
mod error;
mod recorder;

pub use config::{DEFAULT_FPS, DEFAULT_JPEG_QUALITY, RecordConfig};
pub use error::{RecordError, Result};
pub use recorder::{Recorder, RecorderState, RecordingSummary, StartOutcome, file_stem_for};
