#![forbid(unsafe_code)]

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening, writing or closing a recording.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid record config: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open recording {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("frame is {actual_width}x{actual_height} but recording is {width}x{height}")]
    FrameSize {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("failed to encode frame {frame}: {source}")]
    Encode {
        frame: u32,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write frame {frame} to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        frame: u32,
        #[source]
        source: io::Error,
    },

    #[error("failed to finalize recording {}: {source}", path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RecordError {
    /// Whether the error ended an active recording.
    pub const fn aborted_recording(&self) -> bool {
        matches!(
            self,
            Self::Encode { .. } | Self::Write { .. } | Self::Finalize { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;
