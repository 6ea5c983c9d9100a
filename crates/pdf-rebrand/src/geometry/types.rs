//! Geometry value types
//!
//! The same [`Rect`] type is used in both coordinate frames. In display space
//! `(x, y)` is the top-left corner and `y` grows downward; in PDF space
//! `(x, y)` is the bottom-left corner and `y` grows upward.

use crate::constants::GEOMETRY_EPSILON;
use crate::types::DisplaySize;

/// A point in either coordinate frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangular area
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (top edge in display space, bottom edge in PDF space)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The full display rectangle of a page
    pub fn from_size(size: DisplaySize) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Far edge along y (`y + height`)
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center x coordinate
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Center y coordinate
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Multiply every component by `ratio`
    pub fn scaled(&self, ratio: f32) -> Self {
        Self::new(
            self.x * ratio,
            self.y * ratio,
            self.width * ratio,
            self.height * ratio,
        )
    }

    /// Shrink by the given insets, never producing a negative size
    pub fn inset(&self, top: f32, right: f32, bottom: f32, left: f32) -> Self {
        let width = (self.width - left - right).max(0.0);
        let height = (self.height - top - bottom).max(0.0);
        Self::new(self.x + left, self.y + top, width, height)
    }

    /// True when the two rectangles share an area larger than zero.
    ///
    /// Rectangles that only touch along an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        let overlap_w = self.right().min(other.right()) - self.x.max(other.x);
        let overlap_h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        overlap_w > GEOMETRY_EPSILON && overlap_h > GEOMETRY_EPSILON
    }

    /// True when `other` lies inside this rectangle (within tolerance)
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x - GEOMETRY_EPSILON
            && other.y >= self.y - GEOMETRY_EPSILON
            && other.right() <= self.right() + GEOMETRY_EPSILON
            && other.bottom() <= self.bottom() + GEOMETRY_EPSILON
    }

    /// Component-wise comparison within `tolerance`
    pub fn approx_eq(&self, other: &Rect, tolerance: f32) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
    }

    #[test]
    fn test_inset_never_negative() {
        let r = Rect::new(0.0, 700.0, 20.0, 10.0).inset(8.0, 12.0, 8.0, 12.0);
        assert_eq!(r.width, 0.0);
        assert_eq!(r.height, 0.0);
    }
}
