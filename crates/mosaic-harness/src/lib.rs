#![forbid(unsafe_code)]

//! Headless test infrastructure for Mosaic.
//!
//! - [`headless`]: a [`mosaic_backend::Backend`] that keeps presented frames in
//!   memory, replays a key script and steps its clock deterministically.
//! - [`checksum`]: BLAKE3 checksums of canvases for golden comparisons.
//! - [`comparison`]: pixel-level canvas comparison and changed-region
//!   detection.

pub mod checksum;
pub mod comparison;
pub mod headless;

pub use checksum::{canvas_checksum, verify_checksums};
pub use comparison::{CanvasComparator, ComparisonResult, changed_region};
pub use headless::{HeadlessBackend, HeadlessDisplay, HeadlessError, ScriptedKeys, SteppingClock};
