//! Vehicle-versus-obstacle overlap checking.

use crate::config::VehicleParams;
use crate::core::{Box2d, Pose2D};

/// Tests candidate poses against a fixed obstacle set.
///
/// The obstacle slice is borrowed for the duration of one plan call; the
/// caller keeps it immutable until planning finishes. With no obstacles every
/// check passes.
pub struct CollisionChecker<'a> {
    vehicle: VehicleParams,
    obstacles: &'a [Box2d],
}

impl<'a> CollisionChecker<'a> {
    /// Create a checker for the given vehicle footprint and obstacle set.
    pub fn new(vehicle: VehicleParams, obstacles: &'a [Box2d]) -> Self {
        Self { vehicle, obstacles }
    }

    /// Whether the vehicle bounding box at `pose` clears every obstacle.
    pub fn is_pose_clear(&self, pose: &Pose2D) -> bool {
        if self.obstacles.is_empty() {
            return true;
        }
        let footprint = self.vehicle.bounding_box(pose);
        self.obstacles
            .iter()
            .all(|obstacle| !footprint.has_overlap(obstacle))
    }

    /// Whether every pose in a sampled path clears every obstacle.
    pub fn is_path_clear(&self, xs: &[f64], ys: &[f64], phis: &[f64]) -> bool {
        if self.obstacles.is_empty() {
            return true;
        }
        xs.iter()
            .zip(ys)
            .zip(phis)
            .all(|((&x, &y), &phi)| self.is_pose_clear(&Pose2D::new(x, y, phi)))
    }
}
