#![forbid(unsafe_code)]

use mosaic_core::geometry::Rect;
use mosaic_render::{BlitError, Canvas, Rgb};
use thiserror::Error;

use crate::modality::Modality;

/// Reasons a preset definition is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("preset {preset:?} has an empty {width}x{height} canvas")]
    EmptyCanvas {
        preset: String,
        width: u32,
        height: u32,
    },
    #[error("panel {modality} has zero area")]
    EmptyPanel { modality: Modality },
    #[error("panel {modality} at {rect} leaves the {width}x{height} canvas")]
    PanelOutOfBounds {
        modality: Modality,
        rect: Rect,
        width: u32,
        height: u32,
    },
    #[error("panels {first} and {second} overlap")]
    PanelOverlap { first: Modality, second: Modality },
    #[error("modality {modality} is placed twice")]
    DuplicateModality { modality: Modality },
}

/// One modality's fixed region of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub modality: Modality,
    pub rect: Rect,
    /// Flat color painted before the first real image arrives.
    pub placeholder: Rgb,
}

impl Panel {
    #[must_use]
    pub const fn new(modality: Modality, rect: Rect, placeholder: Rgb) -> Self {
        Self {
            modality,
            rect,
            placeholder,
        }
    }

    /// Top-left corner as `(x, y)`.
    #[inline]
    pub const fn offset(&self) -> (u32, u32) {
        (self.rect.x, self.rect.y)
    }

    /// `(width, height)` a source image must have.
    #[inline]
    pub const fn size(&self) -> (u32, u32) {
        self.rect.size()
    }
}

/// An immutable, validated panel layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPreset {
    name: String,
    width: u32,
    height: u32,
    panels: Vec<Panel>,
}

impl LayoutPreset {
    /// Start building a custom preset.
    #[must_use]
    pub fn builder(name: impl Into<String>, width: u32, height: u32) -> PresetBuilder {
        PresetBuilder {
            name: name.into(),
            width,
            height,
            panels: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Canvas `(width, height)`.
    #[inline]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Panels in placement order.
    #[inline]
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Panel for `modality`, if this preset shows it.
    pub fn panel(&self, modality: Modality) -> Option<&Panel> {
        self.panels.iter().find(|p| p.modality == modality)
    }

    pub fn contains(&self, modality: Modality) -> bool {
        self.panel(modality).is_some()
    }

    /// Modalities in placement order.
    pub fn modalities(&self) -> impl Iterator<Item = Modality> + '_ {
        self.panels.iter().map(|p| p.modality)
    }

    /// Paint every placeholder into `canvas`.
    ///
    /// Fails if the canvas is smaller than the preset.
    pub fn paint_placeholders(&self, canvas: &mut Canvas) -> Result<(), BlitError> {
        for panel in &self.panels {
            canvas.fill_rect(panel.rect, panel.placeholder)?;
        }
        Ok(())
    }

    /// A white canvas of this preset's size with placeholders painted.
    #[must_use]
    pub fn new_canvas(&self) -> Canvas {
        let mut canvas = Canvas::new(self.width, self.height);
        if let Err(err) = self.paint_placeholders(&mut canvas) {
            // `build` checked every panel against these dimensions.
            panic!("preset {self} does not fit its own canvas: {err}");
        }
        canvas
    }
}

impl std::fmt::Display for LayoutPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}x{})", self.name, self.width, self.height)
    }
}

/// Builder for custom presets; [`PresetBuilder::build`] validates.
#[derive(Debug, Clone)]
#[must_use]
pub struct PresetBuilder {
    name: String,
    width: u32,
    height: u32,
    panels: Vec<Panel>,
}

impl PresetBuilder {
    /// Place `modality` at `rect` with a flat placeholder.
    pub fn panel(mut self, modality: Modality, rect: Rect, placeholder: Rgb) -> Self {
        self.panels.push(Panel::new(modality, rect, placeholder));
        self
    }

    /// Shorthand for a gray placeholder.
    pub fn gray_panel(self, modality: Modality, rect: Rect, value: u8) -> Self {
        self.panel(modality, rect, Rgb::gray(value))
    }

    /// Validate and freeze the preset.
    pub fn build(self) -> Result<LayoutPreset, LayoutError> {
        if self.width == 0 || self.height == 0 {
            return Err(LayoutError::EmptyCanvas {
                preset: self.name,
                width: self.width,
                height: self.height,
            });
        }
        let bounds = Rect::from_size(self.width, self.height);
        for (i, panel) in self.panels.iter().enumerate() {
            if panel.rect.is_empty() {
                return Err(LayoutError::EmptyPanel {
                    modality: panel.modality,
                });
            }
            if !bounds.contains_rect(&panel.rect) {
                return Err(LayoutError::PanelOutOfBounds {
                    modality: panel.modality,
                    rect: panel.rect,
                    width: self.width,
                    height: self.height,
                });
            }
            for earlier in &self.panels[..i] {
                if earlier.modality == panel.modality {
                    return Err(LayoutError::DuplicateModality {
                        modality: panel.modality,
                    });
                }
                if earlier.rect.overlaps(&panel.rect) {
                    return Err(LayoutError::PanelOverlap {
                        first: earlier.modality,
                        second: panel.modality,
                    });
                }
            }
        }
        Ok(LayoutPreset {
            name: self.name,
            width: self.width,
            height: self.height,
            panels: self.panels,
        })
    }
}

/// Serializable preset description, validated on conversion.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PresetSpec {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub panels: Vec<PanelSpec>,
}

#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PanelSpec {
    pub modality: Modality,
    pub rect: Rect,
    /// Gray level used for the placeholder fill.
    #[serde(default = "default_placeholder")]
    pub placeholder: u8,
}

#[cfg(feature = "serde")]
fn default_placeholder() -> u8 {
    128
}

#[cfg(feature = "serde")]
impl TryFrom<PresetSpec> for LayoutPreset {
    type Error = LayoutError;

    fn try_from(spec: PresetSpec) -> Result<Self, Self::Error> {
        spec.panels
            .into_iter()
            .fold(
                LayoutPreset::builder(spec.name, spec.width, spec.height),
                |b, p| b.gray_panel(p.modality, p.rect, p.placeholder),
            )
            .build()
    }
}
