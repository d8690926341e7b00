//! Geometric types shared by every coordinate space
//!
//! `Point` is `f64`-based because epipolar math and sub-pixel marker
//! positions need it; `Rect` is integer-based because viewports, magnifier
//! windows and frame sub-regions are whole-pixel constructs.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// A point in any of the three coordinate spaces (source, display, magnifier)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Logical size and position of a rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a new rectangle from coordinates
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle of the given size centered on a point
    pub fn centered_on(center: Point, width: i32, height: i32) -> Self {
        let left = center.x.round() as i32 - width / 2;
        let top = center.y.round() as i32 - height / 2;
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    /// Calculate the intersection of two rectangles
    pub fn intersect(&self, other: Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        if left < right && top < bottom {
            Some(Rect {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    /// Translate the rectangle by the given offset
    pub fn translate(&self, x: i32, y: i32) -> Rect {
        Rect {
            left: self.left + x,
            top: self.top + y,
            right: self.right + x,
            bottom: self.bottom + y,
        }
    }

    /// Shift the rectangle, preserving its size, so it lies within `bounds`.
    ///
    /// Returns `None` if the rectangle is larger than `bounds` in either
    /// dimension.
    pub fn clamp_within(&self, bounds: Rect) -> Option<Rect> {
        if self.width() > bounds.width() || self.height() > bounds.height() {
            return None;
        }
        let dx = (bounds.left - self.left).max(0) + (bounds.right - self.right).min(0);
        let dy = (bounds.top - self.top).max(0) + (bounds.bottom - self.bottom).min(0);
        Some(self.translate(dx, dy))
    }

    /// Get the width of the rectangle
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Get the height of the rectangle
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Center of the rectangle
    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) as f64 / 2.0,
            (self.top + self.bottom) as f64 / 2.0,
        )
    }

    /// Top-left corner as a point
    pub fn origin(&self) -> Point {
        Point::new(self.left as f64, self.top as f64)
    }

    /// Convert to dimensions (NonZeroU32 width and height)
    pub fn dimensions(self) -> Option<RectDimension> {
        let width = NonZeroU32::new(self.width().unsigned_abs())?;
        let height = NonZeroU32::new(self.height().unsigned_abs())?;
        Some(RectDimension { width, height })
    }

    /// Check if this rectangle contains an integer point
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Check if this rectangle contains a fractional point
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.left as f64
            && p.x < self.right as f64
            && p.y >= self.top as f64
            && p.y < self.bottom as f64
    }
}

/// Non-zero dimensions of a rectangle
#[derive(Clone, Copy, Debug)]
pub struct RectDimension {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl RectDimension {
    /// Get the width as u32
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    /// Get the height as u32
    pub fn height(&self) -> u32 {
        self.height.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_within_shifts_back_inside() {
        let bounds = Rect::new(0, 0, 800, 600);
        let r = Rect::new(700, -40, 900, 160).clamp_within(bounds).unwrap();
        assert_eq!(r, Rect::new(600, 0, 800, 200));
        assert_eq!(r.width(), 200);
        assert_eq!(r.height(), 200);
    }

    #[test]
    fn clamp_within_rejects_oversized() {
        let bounds = Rect::new(0, 0, 100, 100);
        assert!(Rect::new(0, 0, 150, 50).clamp_within(bounds).is_none());
    }

    #[test]
    fn centered_rect_contains_its_center() {
        let r = Rect::centered_on(Point::new(400.0, 300.0), 128, 128);
        assert!(r.contains_point(Point::new(400.0, 300.0)));
        assert_eq!(r.width(), 128);
    }
}
