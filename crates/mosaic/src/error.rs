#![forbid(unsafe_code)]

//! Mosaic error model and graceful degradation.
//!
//! Every error is local to one frame. [`Error::degradation`] tells a driver
//! loop how to keep going: drop the update, drop the recording, drop the
//! frame, or shut down.

use std::path::PathBuf;

use mosaic_layout::{LayoutError, Modality};
use mosaic_record::RecordError;
use mosaic_render::BlitError;
use thiserror::Error;

// ── Domain-Specific Error Types ─────────────────────────────────────────

/// A panel update that was rejected. The canvas is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    #[error("preset {preset:?} has no {modality} panel")]
    UnknownModality { preset: String, modality: Modality },
    #[error(
        "{modality} image is {actual_width}x{actual_height} but the panel is {width}x{height}"
    )]
    SizeMismatch {
        modality: Modality,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error(transparent)]
    OutOfBounds(#[from] BlitError),
}

/// Failures reported by the backend. Messages are captured as text because
/// backend error types are platform specific.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("key poll failed: {0}")]
    Poll(String),
    #[error("display failed: {0}")]
    Present(String),
    #[error("display is closed")]
    Closed,
}

/// Problems loading or validating an [`OverlayConfig`](crate::OverlayConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension for {}", .0.display())]
    UnknownFormat(PathBuf),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type for Mosaic.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Update(#[from] UpdateError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("recording is disabled by configuration")]
    RecordingDisabled,
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<BlitError> for Error {
    fn from(err: BlitError) -> Self {
        Self::Update(UpdateError::OutOfBounds(err))
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Config(ConfigError::Layout(err))
    }
}

/// Standard result type for Mosaic APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Graceful Degradation ────────────────────────────────────────────────

/// What a driver loop should do when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationAction {
    /// Keep the previous panel contents and carry on.
    SkipUpdate,
    /// Continue without recording; the overlay itself is fine.
    SkipRecording,
    /// Drop this frame; the next refresh may succeed.
    SkipFrame,
    /// The error is unrecoverable. Finish and exit.
    Shutdown,
}

impl Error {
    /// Determine the graceful degradation action for this error.
    pub fn degradation(&self) -> DegradationAction {
        match self {
            Self::Update(_) => DegradationAction::SkipUpdate,
            Self::Record(_) | Self::RecordingDisabled => DegradationAction::SkipRecording,
            Self::Backend(BackendError::Poll(_) | BackendError::Present(_)) => {
                DegradationAction::SkipFrame
            }
            Self::Backend(BackendError::Closed) => DegradationAction::Shutdown,
            Self::Config(_) => DegradationAction::Shutdown,
        }
    }

    /// Error type label for tracing fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Update(_) => "update",
            Self::Record(_) => "record",
            Self::RecordingDisabled => "recording_disabled",
            Self::Backend(_) => "backend",
            Self::Config(_) => "config",
        }
    }

    /// Whether the error is recoverable (does not require shutdown).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.degradation(), DegradationAction::Shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::geometry::Rect;

    fn blit_error() -> BlitError {
        BlitError {
            region: Rect::new(0, 0, 600, 600),
            canvas_width: 512,
            canvas_height: 512,
        }
    }

    #[test]
    fn update_errors_skip_the_update() {
        let err = Error::from(UpdateError::UnknownModality {
            preset: "two".into(),
            modality: Modality::Map,
        });
        assert_eq!(err.degradation(), DegradationAction::SkipUpdate);
        assert_eq!(err.error_type(), "update");
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "preset \"two\" has no map panel");
    }

    #[test]
    fn blit_errors_convert_to_update_errors() {
        let err = Error::from(blit_error());
        assert!(matches!(err, Error::Update(UpdateError::OutOfBounds(_))));
        assert!(err.to_string().contains("exceeds 512x512 canvas"));
    }

    #[test]
    fn recording_errors_skip_recording() {
        let err = Error::from(RecordError::InvalidConfig(vec!["record.fps must be > 0".into()]));
        assert_eq!(err.degradation(), DegradationAction::SkipRecording);
        assert_eq!(Error::RecordingDisabled.degradation(), DegradationAction::SkipRecording);
    }

    #[test]
    fn closed_display_shuts_down() {
        let err = Error::from(BackendError::Closed);
        assert_eq!(err.degradation(), DegradationAction::Shutdown);
        assert!(!err.is_recoverable());
        let poll = Error::from(BackendError::Poll("eof".into()));
        assert_eq!(poll.degradation(), DegradationAction::SkipFrame);
    }

    #[test]
    fn config_errors_shut_down() {
        let err = Error::from(ConfigError::Validation(vec!["a".into(), "b".into()]));
        assert_eq!(err.degradation(), DegradationAction::Shutdown);
        assert_eq!(err.to_string(), "validation errors: a; b");
    }
}
