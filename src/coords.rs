//! Display-space to source-space coordinate mapping.
//!
//! The video element is rendered at whatever size the window gives it, while
//! annotations are stored at the native resolution of the video. Scale
//! factors are computed independently per axis, so letterboxed or stretched
//! display is handled.

use crate::model::{Point, Rect, Size};

/// Maps rectangles between a display surface and the source video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    display: Size,
    scale_x: f64,
    scale_y: f64,
}

impl CoordinateMapper {
    /// Create a mapper, or `None` if mapping is unavailable because either
    /// surface has a zero, negative or non-finite dimension.
    pub fn new(display: Size, source: Size) -> Option<Self> {
        if !display.is_usable() || !source.is_usable() {
            return None;
        }
        Some(Self {
            display,
            scale_x: source.width / display.width,
            scale_y: source.height / display.height,
        })
    }

    /// Size of the display surface the mapper was built for.
    pub fn display_size(&self) -> Size {
        self.display
    }

    /// Per-axis factors `(source / display)`.
    pub fn scale(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }

    pub fn point_to_source(&self, p: Point) -> Point {
        Point::new(p.x * self.scale_x, p.y * self.scale_y)
    }

    pub fn point_to_display(&self, p: Point) -> Point {
        Point::new(p.x / self.scale_x, p.y / self.scale_y)
    }

    /// Convert a display-space rectangle to source space.
    pub fn to_source(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x * self.scale_x,
            rect.y * self.scale_y,
            rect.width * self.scale_x,
            rect.height * self.scale_y,
        )
    }

    /// Convert a source-space rectangle to display space.
    pub fn to_display(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x / self.scale_x,
            rect.y / self.scale_y,
            rect.width / self.scale_x,
            rect.height / self.scale_y,
        )
    }
}

/// One-shot display to source conversion.
pub fn to_source(rect: Rect, display: Size, source: Size) -> Option<Rect> {
    CoordinateMapper::new(display, source).map(|m| m.to_source(rect))
}

/// One-shot source to display conversion.
pub fn to_display(rect: Rect, display: Size, source: Size) -> Option<Rect> {
    CoordinateMapper::new(display, source).map(|m| m.to_display(rect))
}
