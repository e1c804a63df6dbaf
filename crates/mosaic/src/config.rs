#![forbid(unsafe_code)]

//! Overlay configuration.
//!
//! Loaded from TOML or JSON; every field has a default, so a config file only
//! names what it changes:
//!
//! ```toml
//! recording_enabled = true
//! preset = "four"
//!
//! [record]
//! output_dir = "recordings"
//! create_dir = true
//! ```

use std::path::Path;
use std::time::Duration;

use mosaic_layout::{LayoutPreset, PresetKind, PresetSpec};
use mosaic_record::RecordConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest accepted key poll timeout.
pub const MAX_POLL_TIMEOUT_MS: u64 = 1_000;

/// Runtime configuration for an [`Overlay`](crate::Overlay).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Poll keys and allow recording. When false, `refresh` only presents.
    pub recording_enabled: bool,
    /// How long one key poll may wait, in milliseconds.
    pub poll_timeout_ms: u64,
    /// Built-in layout used unless `custom_preset` is set.
    pub preset: PresetKind,
    /// Custom layout; takes precedence over `preset`.
    pub custom_preset: Option<PresetSpec>,
    /// Title of the display window, where the backend has one.
    pub window_title: String,
    pub record: RecordConfig,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            recording_enabled: false,
            poll_timeout_ms: 1,
            preset: PresetKind::default(),
            custom_preset: None,
            window_title: "mosaic".to_string(),
            record: RecordConfig::default(),
        }
    }
}

impl OverlayConfig {
    #[must_use]
    pub fn with_recording(mut self, enabled: bool) -> Self {
        self.recording_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_poll_timeout_ms(mut self, ms: u64) -> Self {
        self.poll_timeout_ms = ms;
        self
    }

    #[must_use]
    pub fn with_preset(mut self, preset: PresetKind) -> Self {
        self.preset = preset;
        self
    }

    #[must_use]
    pub fn with_custom_preset(mut self, spec: PresetSpec) -> Self {
        self.custom_preset = Some(spec);
        self
    }

    #[must_use]
    pub fn with_window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    #[must_use]
    pub fn with_record(mut self, record: RecordConfig) -> Self {
        self.record = record;
        self
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    /// The layout this config selects.
    pub fn layout(&self) -> Result<LayoutPreset, ConfigError> {
        match &self.custom_preset {
            Some(spec) => Ok(LayoutPreset::try_from(spec.clone())?),
            None => Ok(self.preset.preset()),
        }
    }

    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_str(&read(path.as_ref())?)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&read(path.as_ref())?)
    }

    /// Load by extension (`.toml` or `.json`) and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_file(path)?,
            Some("json") => Self::from_json_file(path)?,
            _ => return Err(ConfigError::UnknownFormat(path.to_path_buf())),
        };
        config.validated()
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.record.validate();
        if self.poll_timeout_ms > MAX_POLL_TIMEOUT_MS {
            errors.push(format!(
                "poll_timeout_ms must be <= {MAX_POLL_TIMEOUT_MS}, got {}",
                self.poll_timeout_ms
            ));
        }
        if self.window_title.trim().is_empty() {
            errors.push("window_title must not be empty".into());
        }
        if let Err(err) = self.layout() {
            errors.push(format!("custom_preset: {err}"));
        }
        errors
    }

    /// `self` if valid, otherwise every problem at once.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
