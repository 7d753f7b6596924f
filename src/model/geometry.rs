//! Rectangle geometry for annotation boxes.
//!
//! Boxes are stored as four corner points in image pixel coordinates but
//! always describe an axis-aligned rectangle. Constructors canonicalize
//! arbitrary corner input into (top-left, top-right, bottom-right,
//! bottom-left) order, so downstream code can rely on the layout.

use serde::{Deserialize, Serialize};

/// A 2D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Integer pixel bounds of a rectangle, derived by truncating the float
/// corners. This is the coordinate form the annotation format serializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BndBox {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

impl BndBox {
    pub fn new(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn width(&self) -> i32 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> i32 {
        self.ymax - self.ymin
    }

    /// Raise the min corner to at least pixel 1.
    ///
    /// The serialized format counts pixels from 1; boxes dragged past the
    /// top or left image edge land at 0 or below and are pulled back in.
    pub fn clamp_min(mut self) -> Self {
        if self.xmin < 1 {
            self.xmin = 1;
        }
        if self.ymin < 1 {
            self.ymin = 1;
        }
        self
    }
}

/// Four corner points forming an axis-aligned rectangle, kept in
/// (top-left, top-right, bottom-right, bottom-left) order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectGeometry {
    corners: [Point; 4],
}

impl RectGeometry {
    /// Build a rectangle from exactly four corner points.
    ///
    /// Corners may arrive in any order and are canonicalized via min/max.
    /// Returns `None` unless the slice has exactly four points and the
    /// derived integer box has positive width and height.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.len() != 4 {
            return None;
        }

        let mut xmin = f32::INFINITY;
        let mut ymin = f32::INFINITY;
        let mut xmax = f32::NEG_INFINITY;
        let mut ymax = f32::NEG_INFINITY;
        for point in points {
            xmin = xmin.min(point.x);
            ymin = ymin.min(point.y);
            xmax = xmax.max(point.x);
            ymax = ymax.max(point.y);
        }

        Self::from_extents(xmin, ymin, xmax, ymax)
    }

    /// Expand an integer box back into four corner points. Returns `None`
    /// for boxes with no area, which can appear in hand-edited files.
    pub fn from_bnd_box(bnd: BndBox) -> Option<Self> {
        Self::from_extents(
            bnd.xmin as f32,
            bnd.ymin as f32,
            bnd.xmax as f32,
            bnd.ymax as f32,
        )
    }

    fn from_extents(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Option<Self> {
        // Degeneracy is judged on the integer box, since that is what gets
        // serialized. A sub-pixel sliver truncates to zero width and is
        // rejected along with inverted and NaN input.
        if xmin as i32 >= xmax as i32 || ymin as i32 >= ymax as i32 {
            return None;
        }

        Some(Self {
            corners: [
                Point::new(xmin, ymin),
                Point::new(xmax, ymin),
                Point::new(xmax, ymax),
                Point::new(xmin, ymax),
            ],
        })
    }

    /// Corner points in (top-left, top-right, bottom-right, bottom-left) order.
    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    pub fn width(&self) -> f32 {
        self.corners[2].x - self.corners[0].x
    }

    pub fn height(&self) -> f32 {
        self.corners[2].y - self.corners[0].y
    }

    /// Integer pixel bounds, truncating fractional corner coordinates.
    pub fn bnd_box(&self) -> BndBox {
        BndBox::new(
            self.corners[0].x as i32,
            self.corners[0].y as i32,
            self.corners[2].x as i32,
            self.corners[2].y as i32,
        )
    }
}
