//! Geometry primitives shared by display space and source space.

use serde::{Deserialize, Serialize};

/// A 2D point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height of a surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are finite and strictly positive.
    ///
    /// Scale factors are only defined between usable sizes.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// An axis-aligned rectangle (top-left corner plus size).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner X coordinate
    pub x: f64,
    /// Top-left corner Y coordinate
    pub y: f64,
    /// Width of the rectangle
    pub width: f64,
    /// Height of the rectangle
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a normalized rectangle from two arbitrary corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let x = p1.x.min(p2.x);
        let y = p1.y.min(p2.y);
        let width = (p1.x - p2.x).abs();
        let height = (p1.y - p2.y).abs();
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The part of this rectangle inside `(0, 0)..(bounds.width, bounds.height)`.
    ///
    /// A rectangle entirely outside collapses to zero width or height.
    pub fn clamp_to(&self, bounds: Size) -> Self {
        let x0 = self.x.clamp(0.0, bounds.width);
        let y0 = self.y.clamp(0.0, bounds.height);
        let x1 = (self.x + self.width).clamp(0.0, bounds.width);
        let y1 = (self.y + self.height).clamp(0.0, bounds.height);
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Both sides strictly larger than `min`.
    pub fn exceeds(&self, min: f64) -> bool {
        self.width > min && self.height > min
    }
}
