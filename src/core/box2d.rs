//! Oriented bounding boxes and overlap testing.

use serde::{Deserialize, Serialize};

use super::pose::Point2D;

/// An oriented rectangle: center, heading, and full extents.
///
/// `length` runs along the heading axis, `width` across it. Used both for
/// the vehicle footprint and for obstacle boxes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Box2d {
    /// Center of the rectangle.
    pub center: Point2D,
    /// Heading of the length axis in radians.
    pub heading: f64,
    /// Full extent along the heading axis in meters.
    pub length: f64,
    /// Full extent across the heading axis in meters.
    pub width: f64,
}

impl Box2d {
    /// Create a new oriented box.
    #[inline]
    pub fn new(center: Point2D, heading: f64, length: f64, width: f64) -> Self {
        Self {
            center,
            heading,
            length,
            width,
        }
    }

    /// Axis-aligned box, convenience for obstacle construction.
    #[inline]
    pub fn axis_aligned(center: Point2D, length: f64, width: f64) -> Self {
        Self::new(center, 0.0, length, width)
    }

    /// Half of the box diagonal, the radius of its circumscribed circle.
    #[inline]
    pub fn circumradius(&self) -> f64 {
        0.5 * (self.length * self.length + self.width * self.width).sqrt()
    }

    /// The four corners in counter-clockwise order.
    pub fn corners(&self) -> [Point2D; 4] {
        let (sin_h, cos_h) = self.heading.sin_cos();
        let dx = 0.5 * self.length;
        let dy = 0.5 * self.width;
        let ax = Point2D::new(cos_h * dx, sin_h * dx);
        let ay = Point2D::new(-sin_h * dy, cos_h * dy);
        [
            Point2D::new(self.center.x + ax.x + ay.x, self.center.y + ax.y + ay.y),
            Point2D::new(self.center.x - ax.x + ay.x, self.center.y - ax.y + ay.y),
            Point2D::new(self.center.x - ax.x - ay.x, self.center.y - ax.y - ay.y),
            Point2D::new(self.center.x + ax.x - ay.x, self.center.y + ax.y - ay.y),
        ]
    }

    /// Separating-axis overlap test against another oriented box.
    ///
    /// Touching boxes count as overlapping.
    pub fn has_overlap(&self, other: &Box2d) -> bool {
        // Circumscribed-circle reject before running the axis tests.
        let center_gap = self.center.distance(&other.center);
        if center_gap > self.circumradius() + other.circumradius() {
            return false;
        }

        let own = self.corners();
        let theirs = other.corners();
        for heading in [
            self.heading,
            self.heading + std::f64::consts::FRAC_PI_2,
            other.heading,
            other.heading + std::f64::consts::FRAC_PI_2,
        ] {
            let (sin_h, cos_h) = heading.sin_cos();
            let axis = Point2D::new(cos_h, sin_h);
            let (a_min, a_max) = project(&own, axis);
            let (b_min, b_max) = project(&theirs, axis);
            if a_max < b_min || b_max < a_min {
                return false;
            }
        }
        true
    }
}

/// Project corner points onto a unit axis, returning the covered interval.
fn project(corners: &[Point2D; 4], axis: Point2D) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for corner in corners {
        let d = corner.x * axis.x + corner.y * axis.y;
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}
