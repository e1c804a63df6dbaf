#![forbid(unsafe_code)]

//! The three built-in presets.
//!
//! Placeholder gray levels: rgb 100, map 120, depth 120, physics 140,
//! semantic/unfilled 180, normal 200.

use std::str::FromStr;

use mosaic_core::geometry::Rect;

use crate::modality::{Modality, ParseModalityError};
use crate::preset::{LayoutPreset, PresetBuilder};

const SMALL: u32 = 256;
const LARGE: u32 = 512;

/// Names of the built-in presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PresetKind {
    /// 512x256: physics, rgb.
    Two,
    /// 512x512: physics, depth, rgb, unfilled.
    Four,
    /// 768x768: every modality except unfilled.
    #[default]
    Six,
}

impl PresetKind {
    pub const ALL: [PresetKind; 3] = [Self::Two, Self::Four, Self::Six];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Two => "two",
            Self::Four => "four",
            Self::Six => "six",
        }
    }

    /// Build the preset.
    #[must_use]
    pub fn preset(self) -> LayoutPreset {
        match self {
            Self::Two => LayoutPreset::two_panel(),
            Self::Four => LayoutPreset::four_panel(),
            Self::Six => LayoutPreset::six_panel(),
        }
    }
}

impl std::fmt::Display for PresetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetKind {
    type Err = ParseModalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "two" | "2" => Ok(Self::Two),
            "four" | "4" => Ok(Self::Four),
            "six" | "6" => Ok(Self::Six),
            _ => Err(ParseModalityError(s.to_string())),
        }
    }
}

fn frozen(builder: PresetBuilder) -> LayoutPreset {
    match builder.build() {
        Ok(preset) => preset,
        // Covered by the built-in preset tests; unreachable for valid constants.
        Err(err) => panic!("built-in preset is invalid: {err}"),
    }
}

impl LayoutPreset {
    /// Physics (left) and RGB (right), 256x256 each.
    #[must_use]
    pub fn two_panel() -> Self {
        frozen(
            LayoutPreset::builder(PresetKind::Two.as_str(), 2 * SMALL, SMALL)
                .gray_panel(Modality::Physics, Rect::square(0, 0, SMALL), 140)
                .gray_panel(Modality::Rgb, Rect::square(SMALL, 0, SMALL), 100),
        )
    }

    /// 2x2 grid of 256x256 panels.
    ///
    /// Physics top left, depth top right, RGB bottom left, unfilled bottom
    /// right.
    #[must_use]
    pub fn four_panel() -> Self {
        frozen(
            LayoutPreset::builder(PresetKind::Four.as_str(), 2 * SMALL, 2 * SMALL)
                .gray_panel(Modality::Physics, Rect::square(0, 0, SMALL), 140)
                .gray_panel(Modality::Depth, Rect::square(SMALL, 0, SMALL), 120)
                .gray_panel(Modality::Rgb, Rect::square(0, SMALL, SMALL), 100)
                .gray_panel(Modality::Unfilled, Rect::square(SMALL, SMALL, SMALL), 180),
        )
    }

    /// All modalities at default resolution.
    ///
    /// ```text
    /// +-----------------+--------+
    /// |                 |  map   |
    /// |      rgb        +--------+
    /// |    512x512      |physics |
    /// +--------+--------+--------+
    /// | depth  | normal |semantic|
    /// +--------+--------+--------+
    /// ```
    #[must_use]
    pub fn six_panel() -> Self {
        frozen(
            LayoutPreset::builder(PresetKind::Six.as_str(), LARGE + SMALL, LARGE + SMALL)
                .gray_panel(Modality::Rgb, Rect::square(0, 0, LARGE), 100)
                .gray_panel(Modality::Semantic, Rect::square(LARGE, LARGE, SMALL), 180)
                .gray_panel(Modality::Depth, Rect::square(0, LARGE, SMALL), 120)
                .gray_panel(Modality::Physics, Rect::square(LARGE, SMALL, SMALL), 140)
                .gray_panel(Modality::Normal, Rect::square(SMALL, LARGE, SMALL), 200)
                .gray_panel(Modality::Map, Rect::square(LARGE, 0, SMALL), 120),
        )
    }

    /// Look a built-in preset up by name (`two`, `four`, `six`).
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        name.parse::<PresetKind>().ok().map(PresetKind::preset)
    }
}
