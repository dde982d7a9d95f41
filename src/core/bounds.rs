//! Axis-aligned planning envelope.

use serde::{Deserialize, Serialize};

use super::pose::Point2D;

/// Axis-aligned rectangular region the search is confined to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner (smallest x and y values).
    pub min: Point2D,
    /// Maximum corner (largest x and y values).
    pub max: Point2D,
}

impl Bounds {
    /// Create a new envelope from min and max corners.
    #[inline]
    pub fn new(min: Point2D, max: Point2D) -> Self {
        Self { min, max }
    }

    /// Create an envelope from [xmin, xmax, ymin, ymax] extents.
    #[inline]
    pub fn from_extents(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            min: Point2D::new(xmin, ymin),
            max: Point2D::new(xmax, ymax),
        }
    }

    /// Width of the envelope (x extent).
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height of the envelope (y extent).
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Whether the envelope is non-degenerate.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x < self.max.x && self.min.y < self.max.y
    }

    /// Check if a point lies inside the envelope (inclusive).
    #[inline]
    pub fn contains(&self, point: Point2D) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}
