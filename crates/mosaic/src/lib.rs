#![forbid(unsafe_code)]

//! Mosaic public facade crate.
//!
//! Mosaic composites fixed-size image panels (RGB, depth, semantic
//! segmentation, physics overlay, surface normals, map) into one canvas,
//! shows it once per frame, and records the result to a motion-JPEG AVI on
//! request (`r` starts, `q` stops).
//!
//! ```
//! use mosaic::prelude::*;
//! use mosaic_harness::HeadlessBackend;
//!
//! let mut overlay = Overlay::new(
//!     LayoutPreset::six_panel(),
//!     HeadlessBackend::new(),
//!     OverlayConfig::default(),
//! )
//! .unwrap();
//! overlay.update_rgb(&PanelImage::gray(512, 512, 0)).unwrap();
//! overlay.refresh().unwrap();
//! assert_eq!(overlay.canvas().get(600, 100), Some(Rgb::gray(120)));
//! ```

pub mod config;
pub mod error;
pub mod overlay;

pub use config::OverlayConfig;
pub use error::{
    BackendError, ConfigError, DegradationAction, Error, Result, UpdateError,
};
pub use overlay::{CommandOutcome, FrameReport, Overlay};

// --- Re-exports -------------------------------------------------------------

pub use mosaic_backend::{Backend, BackendClock, DisplaySink, KeySource, SystemClock};
pub use mosaic_core::command::RecordCommand;
pub use mosaic_core::event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use mosaic_core::geometry::Rect;
pub use mosaic_layout::{LayoutPreset, Modality, Panel, PresetBuilder, PresetKind, PresetSpec};
pub use mosaic_record::{RecordConfig, RecorderState, RecordingSummary, StartOutcome};
pub use mosaic_render::{Canvas, ChannelOrder, PanelImage, Rgb};

/// Everything a driver loop needs.
pub mod prelude {
    pub use crate::{
        Canvas, ChannelOrder, CommandOutcome, DegradationAction, Error, FrameReport,
        LayoutPreset, Modality, Overlay, OverlayConfig, PanelImage, PresetKind, RecordConfig,
        Rect, Result, Rgb,
    };
}
