#![forbid(unsafe_code)]

use std::path::PathBuf;

/// Frame rate of recorded video.
pub const DEFAULT_FPS: u32 = 22;

/// JPEG quality of each recorded frame (1..=100).
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Where and how recordings are written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RecordConfig {
    /// Directory that receives `<prefix>-<timestamp>.avi` files.
    pub output_dir: PathBuf,
    /// Frames per second written into the container header.
    pub fps: u32,
    /// JPEG quality of each frame.
    pub jpeg_quality: u8,
    /// File name prefix.
    pub prefix: String,
    /// Create `output_dir` on start if it is missing.
    pub create_dir: bool,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            fps: DEFAULT_FPS,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            prefix: "record".to_string(),
            create_dir: false,
        }
    }
}

impl RecordConfig {
    /// Record into `dir` with default settings.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: dir.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_create_dir(mut self, create: bool) -> Self {
        self.create_dir = create;
        self
    }

    /// Human-readable problems; empty when the config is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.fps == 0 {
            errors.push("record.fps must be > 0".to_string());
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            errors.push(format!(
                "record.jpeg_quality must be in 1..=100, got {}",
                self.jpeg_quality
            ));
        }
        if self.prefix.is_empty() {
            errors.push("record.prefix must not be empty".to_string());
        } else if self.prefix.contains(['/', '\\']) {
            errors.push(format!(
                "record.prefix must not contain path separators, got {:?}",
                self.prefix
            ));
        }
        errors
    }
}
