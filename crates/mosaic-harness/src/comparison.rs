#![forbid(unsafe_code)]

//! Pixel-level canvas comparison.
//!
//! BLAKE3 checksums are compared first; pixels are only enumerated when the
//! checksums differ.

use mosaic_core::geometry::Rect;
use mosaic_render::{Canvas, Rgb};

use crate::checksum::canvas_checksum;

/// One differing pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelMismatch {
    pub x: u32,
    pub y: u32,
    pub expected: Rgb,
    pub actual: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeMismatch {
    pub expected: (u32, u32),
    pub actual: (u32, u32),
}

/// Result of comparing one frame.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub frame_id: u32,
    pub pass: bool,
    pub expected_checksum: String,
    pub actual_checksum: String,
    pub size_mismatch: Option<SizeMismatch>,
    /// Differing pixels inside the overlapping area.
    pub mismatch_count: usize,
    /// First `max_mismatches` differences, row-major.
    pub mismatches: Vec<PixelMismatch>,
    pub pixels_compared: usize,
}

impl ComparisonResult {
    #[must_use]
    pub fn summary(&self) -> String {
        if self.pass {
            format!(
                "Frame {}: PASS ({} pixels, checksum {})",
                self.frame_id, self.pixels_compared, self.actual_checksum
            )
        } else if let Some(sz) = self.size_mismatch {
            format!(
                "Frame {}: FAIL (size mismatch: expected {}x{}, actual {}x{}, {} pixel mismatches in clipped region)",
                self.frame_id,
                sz.expected.0,
                sz.expected.1,
                sz.actual.0,
                sz.actual.1,
                self.mismatch_count
            )
        } else {
            format!(
                "Frame {}: FAIL ({} mismatches out of {} pixels)",
                self.frame_id, self.mismatch_count, self.pixels_compared
            )
        }
    }

    /// Summary plus one line per captured mismatch.
    #[must_use]
    pub fn detail_report(&self) -> String {
        let mut out = self.summary();
        for m in &self.mismatches {
            out.push_str(&format!(
                "\n  [{},{}] expected {:?} actual {:?}",
                m.x, m.y, m.expected, m.actual
            ));
        }
        if self.mismatch_count > self.mismatches.len() {
            out.push_str(&format!(
                "\n  ... and {} more mismatches",
                self.mismatch_count - self.mismatches.len()
            ));
        }
        out
    }
}

/// Compares canvases for golden-frame verification.
#[derive(Debug, Clone)]
pub struct CanvasComparator {
    /// Maximum number of pixel mismatches captured in detail.
    pub max_mismatches: usize,
}

impl Default for CanvasComparator {
    fn default() -> Self {
        Self { max_mismatches: 50 }
    }
}

impl CanvasComparator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_mismatches(mut self, max: usize) -> Self {
        self.max_mismatches = max;
        self
    }

    /// Compare two canvases, clipping to the common area on a size mismatch.
    #[must_use]
    pub fn compare(&self, frame_id: u32, expected: &Canvas, actual: &Canvas) -> ComparisonResult {
        let expected_checksum = canvas_checksum(expected);
        let actual_checksum = canvas_checksum(actual);
        let w = expected.width().min(actual.width());
        let h = expected.height().min(actual.height());
        let pixels_compared = w as usize * h as usize;

        if expected_checksum == actual_checksum {
            return ComparisonResult {
                frame_id,
                pass: true,
                expected_checksum,
                actual_checksum,
                size_mismatch: None,
                mismatch_count: 0,
                mismatches: Vec::new(),
                pixels_compared,
            };
        }

        let size_mismatch = (expected.size() != actual.size()).then_some(SizeMismatch {
            expected: expected.size(),
            actual: actual.size(),
        });

        let mut mismatch_count = 0;
        let mut mismatches = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let (Some(e), Some(a)) = (expected.get(x, y), actual.get(x, y)) else {
                    continue;
                };
                if e != a {
                    mismatch_count += 1;
                    if mismatches.len() < self.max_mismatches {
                        mismatches.push(PixelMismatch {
                            x,
                            y,
                            expected: e,
                            actual: a,
                        });
                    }
                }
            }
        }

        ComparisonResult {
            frame_id,
            pass: false,
            expected_checksum,
            actual_checksum,
            size_mismatch,
            mismatch_count,
            mismatches,
            pixels_compared,
        }
    }
}

/// Bounding box of every pixel that differs between two same-size canvases.
///
/// `None` when they are identical. Canvases of different sizes report the
/// bounds of the larger one.
pub fn changed_region(before: &Canvas, after: &Canvas) -> Option<Rect> {
    if before.size() != after.size() {
        return Some(Rect::from_size(
            before.width().max(after.width()),
            before.height().max(after.height()),
        ));
    }
    let width = before.width() as usize;
    before
        .pixels()
        .iter()
        .zip(after.pixels())
        .enumerate()
        .filter(|(_, (b, a))| b != a)
        .map(|(i, _)| Rect::new((i % width) as u32, (i / width) as u32, 1, 1))
        .reduce(|acc, px| acc.union(&px))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_render::PanelImage;

    #[test]
    fn identical_canvases_pass() {
        let a = Canvas::new(8, 8);
        let result = CanvasComparator::new().compare(0, &a, &a.clone());
        assert!(result.pass);
        assert_eq!(result.pixels_compared, 64);
        assert!(result.summary().contains("PASS"));
    }

    #[test]
    fn mismatches_are_counted_and_capped() {
        let expected = Canvas::new(8, 8);
        let mut actual = expected.clone();
        actual.blit(&PanelImage::gray(4, 2, 0), 2, 3).unwrap();

        let result = CanvasComparator::new()
            .with_max_mismatches(3)
            .compare(7, &expected, &actual);
        assert!(!result.pass);
        assert_eq!(result.mismatch_count, 8);
        assert_eq!(result.mismatches.len(), 3);
        assert_eq!((result.mismatches[0].x, result.mismatches[0].y), (2, 3));
        assert!(result.detail_report().contains("... and 5 more"));
    }

    #[test]
    fn size_mismatch_compares_clipped_area() {
        let result = CanvasComparator::new().compare(1, &Canvas::new(4, 4), &Canvas::new(6, 4));
        assert!(!result.pass);
        assert_eq!(result.mismatch_count, 0);
        assert_eq!(
            result.size_mismatch,
            Some(SizeMismatch {
                expected: (4, 4),
                actual: (6, 4)
            })
        );
        assert!(result.summary().contains("size mismatch"));
    }

    #[test]
    fn changed_region_bounds_the_diff() {
        let before = Canvas::new(16, 16);
        assert_eq!(changed_region(&before, &before), None);

        let mut after = before.clone();
        after.blit(&PanelImage::gray(3, 2, 0), 5, 9).unwrap();
        after.blit(&PanelImage::gray(1, 1, 0), 1, 10).unwrap();
        assert_eq!(changed_region(&before, &after), Some(Rect::new(1, 9, 7, 2)));
    }

    #[test]
    fn changed_region_with_different_sizes() {
        assert_eq!(
            changed_region(&Canvas::new(4, 8), &Canvas::new(6, 2)),
            Some(Rect::from_size(6, 8))
        );
    }
}
