//! Core geometry types: Size, EdgeInsets, Transform.
//!
//! These carry viewport metrics for [`MediaQuery`](crate::widgets::media::MediaQuery)
//! and the translate offsets used by route transitions. Layout is left to the
//! host surface; nothing here measures or positions nodes.

use std::fmt;
use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A 2D size in logical pixels (width x height).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Total area (width * height).
    #[inline]
    pub fn area(self) -> f32 {
        self.width * self.height
    }

    /// Width divided by height. Zero when the height is zero.
    #[inline]
    pub fn aspect_ratio(self) -> f32 {
        if self.height == 0.0 {
            0.0
        } else {
            self.width / self.height
        }
    }

    /// Whether the viewport is taller than it is wide.
    #[inline]
    pub fn is_portrait(self) -> bool {
        self.height > self.width
    }
}

impl Add for Size {
    type Output = Size;
    #[inline]
    fn add(self, rhs: Size) -> Size {
        Size::new(self.width + rhs.width, self.height + rhs.height)
    }
}

impl Sub for Size {
    type Output = Size;
    #[inline]
    fn sub(self, rhs: Size) -> Size {
        Size::new(
            (self.width - rhs.width).max(0.0),
            (self.height - rhs.height).max(0.0),
        )
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Size({}, {})", self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// EdgeInsets
// ---------------------------------------------------------------------------

/// Insets on the four edges of a box, in logical pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EdgeInsets {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl EdgeInsets {
    /// No insets on any edge.
    pub const ZERO: EdgeInsets = EdgeInsets {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    /// Create insets with explicit values (CSS order: top, right, bottom, left).
    #[inline]
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    /// The same inset on every edge.
    #[inline]
    pub const fn all(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// `vertical` on top/bottom, `horizontal` on left/right.
    #[inline]
    pub const fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Sum of the left and right insets.
    #[inline]
    pub fn horizontal(self) -> f32 {
        self.left + self.right
    }

    /// Sum of the top and bottom insets.
    #[inline]
    pub fn vertical(self) -> f32 {
        self.top + self.bottom
    }

    /// Shrink a size by these insets, clamping at zero.
    #[inline]
    pub fn deflate(self, size: Size) -> Size {
        size - Size::new(self.horizontal(), self.vertical())
    }
}

impl fmt::Display for EdgeInsets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EdgeInsets({}, {}, {}, {})",
            self.top, self.right, self.bottom, self.left
        )
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// A 2D translation expressed as a percentage of the node's own size.
///
/// Route transitions slide pages between two of these. The `Display` form is
/// the style value written to the node (`translateX(100%)`, `translate(-50%, 0%)`).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
}

impl Transform {
    /// The resting position.
    pub const IDENTITY: Transform = Transform { x: 0.0, y: 0.0 };

    /// Create a translation.
    #[inline]
    pub const fn translate(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal translation only.
    #[inline]
    pub const fn translate_x(x: f32) -> Self {
        Self { x, y: 0.0 }
    }

    /// Vertical translation only.
    #[inline]
    pub const fn translate_y(y: f32) -> Self {
        Self { x: 0.0, y }
    }

    /// Linearly interpolate between `self` and `other` by `factor`.
    ///
    /// `factor = 0.0` returns `self`, `factor = 1.0` returns `other`.
    #[inline]
    pub fn blend(self, other: Transform, factor: f32) -> Transform {
        let inv = 1.0 - factor;
        Transform {
            x: self.x * inv + other.x * factor,
            y: self.y * inv + other.y * factor,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.y == 0.0 {
            write!(f, "translateX({}%)", self.x)
        } else if self.x == 0.0 {
            write!(f, "translateY({}%)", self.y)
        } else {
            write!(f, "translate({}%, {}%)", self.x, self.y)
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_area_and_ratio() {
        let s = Size::new(200.0, 100.0);
        assert_eq!(s.area(), 20_000.0);
        assert_eq!(s.aspect_ratio(), 2.0);
        assert!(!s.is_portrait());
        assert_eq!(Size::new(10.0, 0.0).aspect_ratio(), 0.0);
    }

    #[test]
    fn size_sub_clamps() {
        let s = Size::new(10.0, 10.0) - Size::new(20.0, 4.0);
        assert_eq!(s, Size::new(0.0, 6.0));
    }

    #[test]
    fn size_display() {
        assert_eq!(Size::new(1280.0, 720.0).to_string(), "Size(1280, 720)");
    }

    #[test]
    fn edge_insets_sums() {
        let e = EdgeInsets::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(e.horizontal(), 6.0);
        assert_eq!(e.vertical(), 4.0);
        assert_eq!(EdgeInsets::symmetric(8.0, 16.0).horizontal(), 32.0);
        assert_eq!(EdgeInsets::all(2.0).deflate(Size::new(10.0, 10.0)), Size::new(6.0, 6.0));
    }

    #[test]
    fn edge_insets_zero_default() {
        assert_eq!(EdgeInsets::default(), EdgeInsets::ZERO);
        assert_eq!(EdgeInsets::ZERO.to_string(), "EdgeInsets(0, 0, 0, 0)");
    }

    #[test]
    fn transform_display() {
        assert_eq!(Transform::translate_x(100.0).to_string(), "translateX(100%)");
        assert_eq!(Transform::IDENTITY.to_string(), "translateX(0%)");
        assert_eq!(Transform::translate_y(100.0).to_string(), "translateY(100%)");
        assert_eq!(Transform::translate(-50.0, 100.0).to_string(), "translate(-50%, 100%)");
    }

    #[test]
    fn transform_blend_endpoints() {
        let a = Transform::translate_x(100.0);
        let b = Transform::IDENTITY;
        assert_eq!(a.blend(b, 0.0), a);
        assert_eq!(a.blend(b, 1.0), b);
        assert_eq!(a.blend(b, 0.5), Transform::translate_x(50.0));
    }
}
