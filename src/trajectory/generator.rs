//! Open-space trajectory generation pipeline.
//!
//! Ties the pieces together for one planning request: bring the world-frame
//! vehicle state into the request's local frame, run the Hybrid A* warm
//! start, map the result back to the world frame, and partition it at gear
//! reversals. Obstacle polytopes in halfspace form ride along for the
//! downstream optimizers and are only validated here.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;
use serde::Serialize;

use super::partition::{PartitionedTrajectory, TrajectoryPartitioner};
use crate::config::PlannerConfig;
use crate::core::{Bounds, Box2d, Point2D, Pose2D};
use crate::error::{PlanningError, Result};
use crate::planning::HybridAStar;

/// World-frame kinematic state of the vehicle.
#[derive(Clone, Copy, Debug, Default)]
pub struct VehicleState {
    /// X position in meters.
    pub x: f64,
    /// Y position in meters.
    pub y: f64,
    /// Heading in radians.
    pub heading: f64,
    /// Signed linear velocity in m/s.
    pub linear_velocity: f64,
}

/// Obstacle polytopes in halfspace form, `A·p ≤ b` per obstacle.
///
/// The warm start itself checks collisions against oriented boxes; this
/// representation is handed through untouched to the dual-variable and
/// distance-approach optimizers downstream.
#[derive(Clone, Debug, Default)]
pub struct ObstaclePolytopes {
    /// Number of edges of each obstacle, in obstacle order.
    pub edges_per_obstacle: Vec<usize>,
    /// Rows of the stacked A matrix, one `[a1, a2]` per edge.
    pub a: Vec<[f64; 2]>,
    /// Entries of the stacked b vector, one per edge.
    pub b: Vec<f64>,
}

impl ObstaclePolytopes {
    fn validate(&self) -> Result<()> {
        let total_edges: usize = self.edges_per_obstacle.iter().sum();
        if self.a.len() != total_edges || self.b.len() != total_edges {
            return Err(PlanningError::InvalidInput(format!(
                "obstacle polytopes inconsistent: {} edges declared, A has {} rows, b has {}",
                total_edges,
                self.a.len(),
                self.b.len()
            )));
        }
        Ok(())
    }
}

/// One open-space planning request.
#[derive(Clone, Debug)]
pub struct PlanningRequest {
    /// Current vehicle state in the world frame.
    pub vehicle_state: VehicleState,
    /// Planning envelope [xmin, xmax, ymin, ymax] in the local frame.
    pub xy_bounds: [f64; 4],
    /// Rotation of the local frame relative to the world frame in radians.
    pub rotate_angle: f64,
    /// Origin of the local frame in world coordinates.
    pub translate_origin: Point2D,
    /// Goal [x, y, phi, v] in the local frame. The end velocity rides along
    /// for the downstream optimizers; the warm start plans to a standstill.
    pub end_pose: [f64; 4],
    /// Obstacles in halfspace form for the downstream optimizers.
    pub obstacle_polytopes: ObstaclePolytopes,
    /// Obstacle boxes in the local frame used for collision checking.
    pub obstacles: Vec<Box2d>,
}

/// Warm-start vectors retained for offline inspection.
///
/// Informational only; nothing downstream of the debug sink may depend on
/// it. All values are in the local planning frame.
#[derive(Clone, Debug, Serialize)]
pub struct WarmStartDebug {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub phi: Vec<f64>,
    pub v: Vec<f64>,
    pub a: Vec<f64>,
    pub steer: Vec<f64>,
    pub xy_bounds: [f64; 4],
}

/// Two-stage open-space trajectory generator.
///
/// Runs as a single-threaded cooperative task; the stop handle lets another
/// thread cancel an in-flight plan between search iterations.
pub struct OpenSpaceTrajectoryGenerator {
    warm_start: HybridAStar,
    partitioner: TrajectoryPartitioner,
    stop: Arc<AtomicBool>,
    debug: Option<WarmStartDebug>,
}

impl OpenSpaceTrajectoryGenerator {
    /// Create a generator from a configuration, validating it first.
    pub fn new(config: &PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            warm_start: HybridAStar::new(config),
            partitioner: TrajectoryPartitioner::new(
                config.warm_start.delta_t,
                config.vehicle.wheel_base,
            ),
            stop: Arc::new(AtomicBool::new(false)),
            debug: None,
        })
    }

    /// Shared flag for cancelling an in-flight plan from another thread.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Clear a previous cancellation before the next request.
    pub fn clear_stop(&self) {
        self.stop.store(false, Ordering::Release);
    }

    /// Plan a partitioned trajectory for one request.
    pub fn plan(&mut self, request: &PlanningRequest) -> Result<PartitionedTrajectory> {
        request.obstacle_polytopes.validate()?;
        let [xmin, xmax, ymin, ymax] = request.xy_bounds;
        let bounds = Bounds::from_extents(xmin, xmax, ymin, ymax);

        // The request defines the local frame; express the world-frame state
        // in it. The goal already is local.
        let frame = Pose2D::new(
            request.translate_origin.x,
            request.translate_origin.y,
            request.rotate_angle,
        );
        let world_start = Pose2D::new(
            request.vehicle_state.x,
            request.vehicle_state.y,
            request.vehicle_state.heading,
        );
        let start = frame.inverse().compose(&world_start);
        let goal = Pose2D::new(request.end_pose[0], request.end_pose[1], request.end_pose[2]);
        debug!(
            "[OpenSpace] planning from ({:.2}, {:.2}, {:.2}) to ({:.2}, {:.2}, {:.2}) in local frame",
            start.x, start.y, start.phi, goal.x, goal.y, goal.phi
        );

        let stop = Arc::clone(&self.stop);
        let mut result = self
            .warm_start
            .plan(start, goal, &bounds, &request.obstacles, &stop)?;
        self.debug = Some(WarmStartDebug {
            x: result.x.clone(),
            y: result.y.clone(),
            phi: result.phi.clone(),
            v: result.v.clone(),
            a: result.a.clone(),
            steer: result.steer.clone(),
            xy_bounds: request.xy_bounds,
        });

        // Rescale the states back to the world frame before publishing.
        for i in 0..result.x.len() {
            let world = frame.compose(&Pose2D::new(result.x[i], result.y[i], result.phi[i]));
            result.x[i] = world.x;
            result.y[i] = world.y;
            result.phi[i] = world.phi;
        }

        self.partitioner.partition(&result)
    }

    /// Warm-start vectors of the most recent successful search.
    pub fn warm_start_debug(&self) -> Option<&WarmStartDebug> {
        self.debug.as_ref()
    }
}
