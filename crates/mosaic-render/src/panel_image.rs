#![forbid(unsafe_code)]

//! Owned source images handed to the canvas by the simulation driver.
//!
//! A [`PanelImage`] is what a modality producer (camera, depth renderer,
//! segmentation pass) supplies each frame. Pixels are stored row-major as
//! [`Rgb`]; every constructor that accepts raw samples validates the sample
//! count against the declared size up front, so a `PanelImage` is always
//! internally consistent.

use thiserror::Error;

use crate::pixel::{ChannelOrder, Rgb};

/// Errors raised while building a [`PanelImage`] from raw samples.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// The sample slice does not match `width * height * channels`.
    #[error(
        "{width}x{height} image with {channels} channel(s) needs {expected} samples, got {actual}"
    )]
    LengthMismatch {
        width: u32,
        height: u32,
        channels: u8,
        expected: usize,
        actual: usize,
    },
}

/// An owned RGB image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelImage {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PanelImage {
    /// Image of `width x height` filled with `color`.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Flat gray image, the shape placeholder panels use.
    #[must_use]
    pub fn gray(width: u32, height: u32, value: u8) -> Self {
        Self::filled(width, height, Rgb::gray(value))
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgb) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build from interleaved three-channel bytes laid out in `order`.
    pub fn from_raw(
        width: u32,
        height: u32,
        bytes: &[u8],
        order: ChannelOrder,
    ) -> Result<Self, ImageError> {
        check_len(width, height, 3, bytes.len())?;
        let pixels = bytes
            .chunks_exact(3)
            .map(|c| Rgb::from_bytes([c[0], c[1], c[2]], order))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from single-channel samples, broadcast to all three channels.
    ///
    /// Depth and mask producers usually emit one channel.
    pub fn from_gray(width: u32, height: u32, samples: &[u8]) -> Result<Self, ImageError> {
        check_len(width, height, 1, samples.len())?;
        Ok(Self {
            width,
            height,
            pixels: samples.iter().copied().map(Rgb::gray).collect(),
        })
    }

    /// Build from interleaved floating-point samples in `0.0..=255.0`.
    ///
    /// Out-of-range samples are clamped; fractional parts are truncated.
    pub fn from_f32(
        width: u32,
        height: u32,
        samples: &[f32],
        order: ChannelOrder,
    ) -> Result<Self, ImageError> {
        check_len(width, height, 3, samples.len())?;
        let pixels = samples
            .chunks_exact(3)
            .map(|c| {
                Rgb::from_bytes(
                    [Rgb::quantize(c[0]), Rgb::quantize(c[1]), Rgb::quantize(c[2])],
                    order,
                )
            })
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` pair.
    #[inline]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    /// One scanline.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[Rgb] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels[start..start + w]
    }

    /// All pixels, row-major.
    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Mutable access to all pixels, row-major. The size cannot change.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgb] {
        &mut self.pixels
    }

    /// Whether every pixel equals `color`.
    pub fn is_uniform(&self, color: Rgb) -> bool {
        self.pixels.iter().all(|&px| px == color)
    }
}

impl From<&::image::RgbImage> for PanelImage {
    fn from(img: &::image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.pixels().map(|p| Rgb::new(p[0], p[1], p[2])).collect(),
        }
    }
}

impl From<::image::RgbImage> for PanelImage {
    fn from(img: ::image::RgbImage) -> Self {
        Self::from(&img)
    }
}

fn check_len(width: u32, height: u32, channels: u8, actual: usize) -> Result<(), ImageError> {
    // Saturates, and no slice is usize::MAX bytes long.
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(usize::from(channels));
    if actual == expected {
        Ok(())
    } else {
        Err(ImageError::LengthMismatch {
            width,
            height,
            channels,
            expected,
            actual,
        })
    }
}
