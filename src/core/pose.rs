//! Planar point and oriented pose types.

use serde::{Deserialize, Serialize};

use super::math::normalize_angle;

/// A 2D point in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate in meters
    pub x: f64,
    /// Y coordinate in meters
    pub y: f64,
}

impl Point2D {
    /// Create a new point.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point (avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point2D) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// An oriented pose in the planar frame.
///
/// Position (x, y) in meters, heading `phi` in radians normalized to [-π, π].
/// A pose doubles as a rigid transform: `compose` applies another pose in
/// this pose's frame, `inverse` undoes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// X position in meters
    pub x: f64,
    /// Y position in meters
    pub y: f64,
    /// Heading in radians, normalized to [-π, π]
    pub phi: f64,
}

impl Pose2D {
    /// Create a new pose with `phi` normalized.
    #[inline]
    pub fn new(x: f64, y: f64, phi: f64) -> Self {
        Self {
            x,
            y,
            phi: normalize_angle(phi),
        }
    }

    /// Identity pose at the origin.
    #[inline]
    pub fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            phi: 0.0,
        }
    }

    /// Position component of the pose.
    #[inline]
    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Compose two poses: apply `other` in this pose's frame.
    #[inline]
    pub fn compose(&self, other: &Pose2D) -> Pose2D {
        let (sin_t, cos_t) = self.phi.sin_cos();
        Pose2D::new(
            self.x + other.x * cos_t - other.y * sin_t,
            self.y + other.x * sin_t + other.y * cos_t,
            self.phi + other.phi,
        )
    }

    /// Inverse transform of this pose.
    #[inline]
    pub fn inverse(&self) -> Pose2D {
        let (sin_t, cos_t) = self.phi.sin_cos();
        Pose2D::new(
            -self.x * cos_t - self.y * sin_t,
            self.x * sin_t - self.y * cos_t,
            -self.phi,
        )
    }
}

impl Default for Pose2D {
    fn default() -> Self {
        Self::identity()
    }
}
