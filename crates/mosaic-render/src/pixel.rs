#![forbid(unsafe_code)]

//! 8-bit RGB pixels and channel-order conversion.

/// Byte order of interleaved three-channel pixel data.
///
/// Canvas samples are always stored as [`Rgb`]; the order only matters when
/// raw bytes cross a boundary (a BGR camera producer, a video encoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelOrder {
    /// Red, green, blue.
    #[default]
    Rgb,
    /// Blue, green, red.
    Bgr,
}

/// A single pixel with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Maximum value in every channel.
    pub const WHITE: Self = Self::gray(u8::MAX);
    pub const BLACK: Self = Self::gray(0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// All three channels set to `value`.
    #[inline]
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value)
    }

    /// Decode three interleaved bytes laid out in `order`.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 3], order: ChannelOrder) -> Self {
        match order {
            ChannelOrder::Rgb => Self::new(bytes[0], bytes[1], bytes[2]),
            ChannelOrder::Bgr => Self::new(bytes[2], bytes[1], bytes[0]),
        }
    }

    /// Encode as three interleaved bytes laid out in `order`.
    #[inline]
    pub const fn to_bytes(self, order: ChannelOrder) -> [u8; 3] {
        match order {
            ChannelOrder::Rgb => [self.r, self.g, self.b],
            ChannelOrder::Bgr => [self.b, self.g, self.r],
        }
    }

    /// Pack as `0x00RRGGBB`, the word layout window framebuffers expect.
    #[inline]
    pub const fn to_packed_0rgb(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Quantize a floating-point sample into `0..=255`.
    ///
    /// Values are clamped, then truncated toward zero. NaN maps to 0.
    #[inline]
    pub fn quantize(sample: f32) -> u8 {
        if sample.is_nan() {
            0
        } else {
            sample.clamp(0.0, 255.0) as u8
        }
    }

    /// Add `delta` to every channel, wrapping on overflow.
    #[inline]
    pub const fn wrapping_add(self, delta: u8) -> Self {
        Self::new(
            self.r.wrapping_add(delta),
            self.g.wrapping_add(delta),
            self.b.wrapping_add(delta),
        )
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(bytes: [u8; 3]) -> Self {
        Self::from_bytes(bytes, ChannelOrder::Rgb)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(px: Rgb) -> Self {
        px.to_bytes(ChannelOrder::Rgb)
    }
}
