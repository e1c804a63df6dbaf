#![forbid(unsafe_code)]

//! Pixel-space geometric primitives.

/// A rectangle of pixels on a canvas.
///
/// Uses image coordinates (0-indexed, origin at top-left, `x` grows to the
/// right and `y` grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `width x height` at the origin.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub const fn square(x: u32, y: u32, side: u32) -> Self {
        Self::new(x, y, side, side)
    }

    /// One past the last column, as `u64` so `x + width` never wraps.
    #[inline]
    pub const fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// One past the last row, as `u64` so `y + height` never wraps.
    #[inline]
    pub const fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether pixel `(x, y)` lies inside.
    #[inline]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && (x as u64) < self.right() && y >= self.y && (y as u64) < self.bottom()
    }

    /// Whether `other` fits entirely inside `self`.
    ///
    /// An empty `other` fits if its origin does.
    #[inline]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Shared pixels of `self` and `other`, or `None` when they only touch
    /// or are apart.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if u64::from(left) >= right || u64::from(top) >= bottom {
            return None;
        }
        // Both extents are bounded by one of the input widths/heights.
        Some(Rect::new(
            left,
            top,
            (right - u64::from(left)) as u32,
            (bottom - u64::from(top)) as u32,
        ))
    }

    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    /// Bounding box of both rectangles, clamped to `u32` extents.
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let extent = |far: u64, near: u32| u32::try_from(far - u64::from(near)).unwrap_or(u32::MAX);
        Rect::new(
            left,
            top,
            extent(self.right().max(other.right()), left),
            extent(self.bottom().max(other.bottom()), top),
        )
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}
