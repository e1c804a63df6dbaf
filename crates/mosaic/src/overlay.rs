#![forbid(unsafe_code)]

//! The frame-driven overlay.
//!
//! An external driver feeds panel images with `update_*` and calls
//! [`Overlay::refresh`] once per frame. A refresh runs four steps in order:
//!
//! 1. poll one key (only when recording is enabled) and apply `r` / `q`;
//! 2. take the composited canvas as the frame;
//! 3. append it to the recording, if one is active;
//! 4. present it on the display.
//!
//! A failed start or a failed append is reported after the frame has been
//! presented, so the display never stalls on recorder I/O.

use std::path::Path;

use mosaic_backend::{Backend, BackendClock, DisplaySink, KeySource};
use mosaic_core::command::RecordCommand;
use mosaic_core::geometry::Rect;
use mosaic_layout::{LayoutPreset, Modality};
use mosaic_record::{Recorder, RecordingSummary, StartOutcome};
use mosaic_render::{Canvas, PanelImage};

use crate::config::OverlayConfig;
use crate::error::{BackendError, Error, Result, UpdateError};

/// What a key command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A new recording file was opened.
    Started(std::path::PathBuf),
    /// `start` while already recording.
    AlreadyRecording,
    /// The recording was finalized.
    Stopped(RecordingSummary),
    /// `stop` while idle.
    NotRecording,
}

/// Per-frame summary returned by [`Overlay::refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    /// Zero-based refresh counter.
    pub frame: u64,
    /// Outcome of the key polled this frame, if it was a command.
    pub command: Option<CommandOutcome>,
    /// Whether this frame was written to the recording.
    pub recorded: bool,
}

/// Static panel overlay parameterized by a [`LayoutPreset`].
pub struct Overlay<B: Backend> {
    preset: LayoutPreset,
    canvas: Canvas,
    recorder: Recorder,
    backend: B,
    config: OverlayConfig,
    frame: u64,
}

impl<B: Backend> std::fmt::Debug for Overlay<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overlay")
            .field("preset", &self.preset.to_string())
            .field("recorder", &self.recorder)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> Overlay<B> {
    /// Build an overlay with a white canvas and the preset's placeholders.
    ///
    /// Fails if `config` does not validate.
    pub fn new(preset: LayoutPreset, backend: B, config: OverlayConfig) -> Result<Self> {
        let config = config.validated()?;
        let canvas = preset.new_canvas();
        tracing::debug!(
            preset = %preset,
            recording_enabled = config.recording_enabled,
            "overlay created"
        );
        Ok(Self {
            preset,
            canvas,
            recorder: Recorder::new(config.record.clone()),
            backend,
            config,
            frame: 0,
        })
    }

    /// Build an overlay for the layout named in `config`.
    pub fn from_config(backend: B, config: OverlayConfig) -> Result<Self> {
        let preset = config.layout()?;
        Self::new(preset, backend, config)
    }

    /// Load, validate and apply a `.toml` or `.json` config file.
    pub fn from_config_file(backend: B, path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(backend, OverlayConfig::load(path)?)
    }

    #[inline]
    pub fn preset(&self) -> &LayoutPreset {
        &self.preset
    }

    #[inline]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Direct canvas access for free-form blits.
    #[inline]
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    #[inline]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Refreshes performed so far.
    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn recording_path(&self) -> Option<&Path> {
        self.recorder.path()
    }

    // ── Panel updates ───────────────────────────────────────────────────

    /// Blit `image` into the panel for `modality`.
    ///
    /// The image must match the panel size exactly. On error the canvas is
    /// unchanged.
    pub fn update(&mut self, modality: Modality, image: &PanelImage) -> Result<Rect> {
        let Some(panel) = self.preset.panel(modality) else {
            return Err(UpdateError::UnknownModality {
                preset: self.preset.name().to_string(),
                modality,
            }
            .into());
        };
        let (width, height) = panel.size();
        if image.size() != (width, height) {
            return Err(UpdateError::SizeMismatch {
                modality,
                width,
                height,
                actual_width: image.width(),
                actual_height: image.height(),
            }
            .into());
        }
        let (x, y) = panel.offset();
        Ok(self.canvas.blit(image, x, y)?)
    }

    pub fn update_rgb(&mut self, image: &PanelImage) -> Result<Rect> {
        self.update(Modality::Rgb, image)
    }

    pub fn update_depth(&mut self, image: &PanelImage) -> Result<Rect> {
        self.update(Modality::Depth, image)
    }

    pub fn update_physics(&mut self, image: &PanelImage) -> Result<Rect> {
        self.update(Modality::Physics, image)
    }

    pub fn update_map(&mut self, image: &PanelImage) -> Result<Rect> {
        self.update(Modality::Map, image)
    }

    pub fn update_normal(&mut self, image: &PanelImage) -> Result<Rect> {
        self.update(Modality::Normal, image)
    }

    /// Semantic segmentation panel.
    pub fn update_sem(&mut self, image: &PanelImage) -> Result<Rect> {
        self.update(Modality::Semantic, image)
    }

    pub fn update_unfilled(&mut self, image: &PanelImage) -> Result<Rect> {
        self.update(Modality::Unfilled, image)
    }

    /// Repaint every panel with its placeholder.
    pub fn reset_placeholders(&mut self) {
        self.canvas = self.preset.new_canvas();
    }

    /// Set every pixel to white, then refresh immediately.
    pub fn clear(&mut self) -> Result<FrameReport> {
        self.canvas.clear();
        self.refresh()
    }

    // ── Input and recording ─────────────────────────────────────────────

    /// Poll one key and decode it. Always `None` when recording is disabled.
    pub fn poll_input(&mut self) -> Result<Option<RecordCommand>> {
        if !self.config.recording_enabled {
            return Ok(None);
        }
        let timeout = self.config.poll_timeout();
        let key = self
            .backend
            .keys()
            .poll_key(timeout)
            .map_err(|e| BackendError::Poll(e.to_string()))?;
        Ok(key.as_ref().and_then(RecordCommand::from_key))
    }

    /// Apply a start/stop command to the recorder.
    pub fn apply_command(&mut self, command: RecordCommand) -> Result<CommandOutcome> {
        tracing::debug!(frame = self.frame, %command, "record command");
        match command {
            RecordCommand::Start => Ok(match self.start_recording()? {
                StartOutcome::Started(path) => CommandOutcome::Started(path),
                StartOutcome::AlreadyRecording(_) => CommandOutcome::AlreadyRecording,
            }),
            RecordCommand::Stop => Ok(match self.stop_recording()? {
                Some(summary) => CommandOutcome::Stopped(summary),
                None => CommandOutcome::NotRecording,
            }),
        }
    }

    /// Open a recording sized to the canvas, timestamped by the backend clock.
    ///
    /// Ignored while already recording. Rejected when recording is disabled.
    pub fn start_recording(&mut self) -> Result<StartOutcome> {
        if !self.config.recording_enabled {
            return Err(Error::RecordingDisabled);
        }
        let now = self.backend.clock().now_local();
        let (width, height) = self.canvas.size();
        Ok(self.recorder.start(now, width, height)?)
    }

    /// Finalize the recording. No-op while idle.
    pub fn stop_recording(&mut self) -> Result<Option<RecordingSummary>> {
        Ok(self.recorder.stop()?)
    }

    /// Append the current canvas to the recording. Returns whether a frame
    /// was written.
    pub fn composite(&mut self) -> Result<bool> {
        if !self.recorder.is_recording() {
            return Ok(false);
        }
        self.recorder.append(&self.canvas)?;
        Ok(true)
    }

    /// Push the canvas to the display.
    pub fn present(&mut self) -> Result<()> {
        let display = self.backend.display();
        if !display.is_open() {
            return Err(BackendError::Closed.into());
        }
        display
            .present(&self.canvas)
            .map_err(|e| BackendError::Present(e.to_string()).into())
    }

    /// Run one frame: input, recording, display.
    ///
    /// A key poll failure skips the whole frame. A recorder failure is
    /// returned after the frame has been presented.
    pub fn refresh(&mut self) -> Result<FrameReport> {
        let frame = self.frame;
        self.frame += 1;

        let mut deferred = None;
        let command = match self.poll_input()? {
            Some(cmd) => match self.apply_command(cmd) {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    deferred = Some(err);
                    None
                }
            },
            None => None,
        };

        let recorded = match self.composite() {
            Ok(recorded) => recorded,
            Err(err) => {
                deferred.get_or_insert(err);
                false
            }
        };

        if let Err(present) = self.present() {
            if let Some(err) = deferred {
                tracing::warn!(
                    frame,
                    error_type = err.error_type(),
                    error = %err,
                    "recorder error superseded by failed present"
                );
            }
            return Err(present);
        }

        if let Some(err) = deferred {
            tracing::warn!(frame, error_type = err.error_type(), error = %err, "refresh degraded");
            return Err(err);
        }
        Ok(FrameReport {
            frame,
            command,
            recorded,
        })
    }

    /// Stop any active recording and release the overlay.
    pub fn finish(mut self) -> Result<Option<RecordingSummary>> {
        self.stop_recording()
    }
}
