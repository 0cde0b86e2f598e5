//! Points, rectangles, overlap detection, clamping and grid quantization.
//!
//! All coordinates are canvas pixels with the origin at the top-left corner.
//! Overlap detection is strict: rectangles that only share an edge do not
//! overlap.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MIN_NOTE_HEIGHT, MIN_NOTE_WIDTH};

/// A point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (`x + width`).
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `pt` lies inside the rectangle. The right and bottom edges are exclusive.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x < self.right() && pt.y >= self.y && pt.y < self.bottom()
    }
}

/// Intersection of two rectangles, or `None` when they do not overlap.
///
/// Only strictly positive intersections count; touching edges yield `None`.
/// The result is independent of argument order.
#[must_use]
pub fn overlap(a: &Rect, b: &Rect) -> Option<Rect> {
    let ix1 = a.x.max(b.x);
    let iy1 = a.y.max(b.y);
    let ix2 = a.right().min(b.right());
    let iy2 = a.bottom().min(b.bottom());

    if ix1 < ix2 && iy1 < iy2 {
        Some(Rect { x: ix1, y: iy1, width: ix2 - ix1, height: iy2 - iy1 })
    } else {
        None
    }
}

/// Round `value` to the nearest multiple of `grid`. A zero grid leaves the value unchanged.
#[must_use]
pub fn snap_to_grid(value: f64, grid: u32) -> f64 {
    if grid == 0 {
        return value;
    }
    let g = f64::from(grid);
    (value / g).round() * g
}

/// Lower bounds applied to note geometry on every mutation path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryLimits {
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for GeometryLimits {
    fn default() -> Self {
        Self { min_width: MIN_NOTE_WIDTH, min_height: MIN_NOTE_HEIGHT }
    }
}

impl GeometryLimits {
    #[must_use]
    pub fn clamp_x(&self, x: f64) -> f64 {
        x.max(0.0)
    }

    #[must_use]
    pub fn clamp_y(&self, y: f64) -> f64 {
        y.max(0.0)
    }

    #[must_use]
    pub fn clamp_width(&self, width: f64) -> f64 {
        width.max(self.min_width)
    }

    #[must_use]
    pub fn clamp_height(&self, height: f64) -> f64 {
        height.max(self.min_height)
    }

    /// Clamp a full rectangle. Idempotent.
    #[must_use]
    pub fn clamp(&self, rect: Rect) -> Rect {
        Rect {
            x: self.clamp_x(rect.x),
            y: self.clamp_y(rect.y),
            width: self.clamp_width(rect.width),
            height: self.clamp_height(rect.height),
        }
    }
}
