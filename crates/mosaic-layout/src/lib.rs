#![forbid(unsafe_code)]

//! Panel layout presets.
//!
//! A [`LayoutPreset`] is an immutable value object: a canvas size plus, per
//! [`Modality`], the panel rectangle it occupies and the flat placeholder
//! color painted there before real data arrives. The overlay is parameterized
//! by a preset instead of being subclassed per layout.
//!
//! Three presets ship built in:
//!
//! | Preset | Canvas  | Modalities |
//! |--------|---------|------------|
//! | `two`  | 512x256 | physics, rgb |
//! | `four` | 512x512 | physics, depth, rgb, unfilled |
//! | `six`  | 768x768 | rgb, map, physics, depth, normal, semantic |
//!
//! Custom presets go through [`PresetBuilder`], which rejects panels that
//! leave the canvas or overlap each other.

mod builtin;
mod modality;
mod preset;

pub use builtin::PresetKind;
pub use modality::{Modality, ParseModalityError};
pub use preset::{LayoutError, LayoutPreset, Panel, PresetBuilder};

#[cfg(feature = "serde")]
pub use preset::{PanelSpec, PresetSpec};

pub use mosaic_core::geometry::Rect;
