#![forbid(unsafe_code)]

use std::str::FromStr;

use thiserror::Error;

/// A kind of visual data stream shown in one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Modality {
    /// Color camera image.
    Rgb,
    /// Depth image.
    Depth,
    /// Physics debug overlay.
    Physics,
    /// Top-down map.
    Map,
    /// Semantic segmentation.
    Semantic,
    /// Surface normals.
    Normal,
    /// Spare panel with no producer.
    Unfilled,
}

impl Modality {
    /// Every modality, in declaration order.
    pub const ALL: [Modality; 7] = [
        Self::Rgb,
        Self::Depth,
        Self::Physics,
        Self::Map,
        Self::Semantic,
        Self::Normal,
        Self::Unfilled,
    ];

    /// Stable lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => "rgb",
            Self::Depth => "depth",
            Self::Physics => "physics",
            Self::Map => "map",
            Self::Semantic => "semantic",
            Self::Normal => "normal",
            Self::Unfilled => "unfilled",
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown modality {0:?}")]
pub struct ParseModalityError(pub String);

impl FromStr for Modality {
    type Err = ParseModalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" => Ok(Self::Rgb),
            "depth" => Ok(Self::Depth),
            "physics" => Ok(Self::Physics),
            "map" => Ok(Self::Map),
            "semantic" | "sem" => Ok(Self::Semantic),
            "normal" | "surface_normal" | "surf" => Ok(Self::Normal),
            "unfilled" | "unfill" => Ok(Self::Unfilled),
            _ => Err(ParseModalityError(s.to_string())),
        }
    }
}
