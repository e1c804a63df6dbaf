#![forbid(unsafe_code)]

//! Canvas = fixed-size pixel buffer every frame is composited into.
//!
//! The canvas is addressed as `(x, y)` with `x` the horizontal axis. Storage
//! is row-major, so exporting scanlines for a display or an encoder is a
//! straight walk over memory.
//!
//! Every write is bounds-checked against the canvas before any pixel is
//! touched: a failed blit leaves the buffer exactly as it was.
//!
//! # Usage
//!
//! ```
//! use mosaic_render::{Canvas, PanelImage, Rgb};
//!
//! let mut canvas = Canvas::new(768, 768);
//! canvas.blit(&PanelImage::gray(256, 256, 120), 512, 0).unwrap();
//! assert_eq!(canvas.get(600, 10), Some(Rgb::gray(120)));
//! assert!(canvas.blit(&PanelImage::gray(257, 256, 0), 512, 0).is_err());
//! ```

use mosaic_core::geometry::Rect;
use thiserror::Error;

use crate::panel_image::PanelImage;
use crate::pixel::{ChannelOrder, Rgb};

/// A write that would leave the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("region {region} exceeds {canvas_width}x{canvas_height} canvas")]
pub struct BlitError {
    /// Destination rectangle that was requested.
    pub region: Rect,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

/// Fixed-size RGB pixel buffer.
///
/// Dimensions are set at construction and never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Canvas {
    /// Create a white canvas.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::WHITE; width as usize * height as usize],
        }
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

    /// The whole canvas as a rectangle at the origin.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Pixel at `(x, y)`, or `None` outside the canvas.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// All pixels, row-major.
    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Validate that `region` lies inside the canvas.
    pub fn check_region(&self, region: Rect) -> Result<(), BlitError> {
        if self.bounds().contains_rect(&region) {
            Ok(())
        } else {
            Err(BlitError {
                region,
                canvas_width: self.width,
                canvas_height: self.height,
            })
        }
    }

    /// Copy `image` into the canvas with its top-left corner at `(x, y)`.
    ///
    /// Returns the rectangle that was overwritten. Fails without writing if
    /// any part of the image would fall outside the canvas.
    pub fn blit(&mut self, image: &PanelImage, x: u32, y: u32) -> Result<Rect, BlitError> {
        let region = Rect::new(x, y, image.width(), image.height());
        self.check_region(region)?;

        let w = image.width() as usize;
        for row in 0..image.height() {
            let start = self.index(x, y + row);
            self.pixels[start..start + w].copy_from_slice(image.row(row));
        }
        Ok(region)
    }

    /// Fill `region` with a flat color.
    pub fn fill_rect(&mut self, region: Rect, color: Rgb) -> Result<(), BlitError> {
        self.check_region(region)?;

        let w = region.width as usize;
        for row in region.y..region.y + region.height {
            let start = self.index(region.x, row);
            self.pixels[start..start + w].fill(color);
        }
        Ok(())
    }

    /// Fill the whole canvas with `color`.
    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    /// Reset every sample to the maximum value (white).
    pub fn clear(&mut self) {
        self.fill(Rgb::WHITE);
    }

    /// Copy a region out of the canvas.
    pub fn crop(&self, region: Rect) -> Result<PanelImage, BlitError> {
        self.check_region(region)?;
        Ok(PanelImage::from_fn(region.width, region.height, |dx, dy| {
            self.pixels[self.index(region.x + dx, region.y + dy)]
        }))
    }

    /// Whether every pixel of `region` equals `color`.
    pub fn region_is_uniform(&self, region: Rect, color: Rgb) -> Result<bool, BlitError> {
        self.check_region(region)?;
        let w = region.width as usize;
        Ok((region.y..region.y + region.height).all(|row| {
            let start = self.index(region.x, row);
            self.pixels[start..start + w].iter().all(|&px| px == color)
        }))
    }

    /// Interleaved bytes, row-major, three per pixel in `order`.
    ///
    /// This is the frame layout video encoders and image files consume.
    #[must_use]
    pub fn to_bytes(&self, order: ChannelOrder) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for px in &self.pixels {
            out.extend_from_slice(&px.to_bytes(order));
        }
        out
    }

    /// Write `0x00RRGGBB` words into `out`, reusing its allocation.
    pub fn write_packed_0rgb(&self, out: &mut Vec<u32>) {
        out.clear();
        out.extend(self.pixels.iter().map(|px| px.to_packed_0rgb()));
    }

    /// `0x00RRGGBB` words, row-major.
    #[must_use]
    pub fn to_packed_0rgb(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.pixels.len());
        self.write_packed_0rgb(&mut out);
        out
    }

    /// Export as an `image` buffer for encoding.
    #[must_use]
    pub fn to_rgb_image(&self) -> ::image::RgbImage {
        ::image::RgbImage::from_fn(self.width, self.height, |x, y| {
            ::image::Rgb(self.pixels[self.index(x, y)].to_bytes(ChannelOrder::Rgb))
        })
    }
}
