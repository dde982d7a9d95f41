//! # Sarathi-Plan: Open-Space Motion Planning
//!
//! A two-stage trajectory generator for open-space maneuvers such as parking:
//! given the vehicle's kinematic state, a goal pose, and a set of obstacle
//! boxes, it produces a dynamically feasible, collision-free trajectory that
//! may drive forward and reverse across gear switches.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │          OpenSpaceTrajectoryGenerator               │  ← frame transforms,
//! │                                                     │    request validation
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  HybridAStar                        │  ← warm-start search
//! │     (ReedShepp heuristic, CollisionChecker)         │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │              TrajectoryPartitioner                  │  ← split at gear
//! │                                                     │    reversals
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The warm-start search runs Hybrid A* over a quantized (x, y, heading)
//! space with bicycle-model motion primitives. Reeds-Shepp curves serve both
//! as the admissible cost-to-goal heuristic and as an analytic shortcut: on
//! every expansion the planner tries to connect the current state to the goal
//! with the cached curve, and the first collision-free connection ends the
//! search. The partitioner then differentiates velocities from positions and
//! splits the path into per-gear segments for vehicle control.
//!
//! Downstream smoothing optimizers consume the warm start through
//! [`WarmStartDebug`] and the polytope fields of [`PlanningRequest`]; they
//! are deliberately outside this crate.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sarathi_plan::{
//!     OpenSpaceTrajectoryGenerator, PlannerConfig, PlanningRequest, VehicleState,
//! };
//! use sarathi_plan::core::Point2D;
//! use sarathi_plan::trajectory::ObstaclePolytopes;
//!
//! let config = PlannerConfig::load(std::path::Path::new("planner.toml")).unwrap();
//! let mut generator = OpenSpaceTrajectoryGenerator::new(&config).unwrap();
//!
//! let request = PlanningRequest {
//!     vehicle_state: VehicleState { x: 0.0, y: 0.0, heading: 0.0, linear_velocity: 0.0 },
//!     xy_bounds: [-50.0, 50.0, -50.0, 50.0],
//!     rotate_angle: 0.0,
//!     translate_origin: Point2D::new(0.0, 0.0),
//!     end_pose: [10.0, 0.0, 0.0, 0.0],
//!     obstacle_polytopes: ObstaclePolytopes::default(),
//!     obstacles: Vec::new(),
//! };
//! let trajectory = generator.plan(&request).unwrap();
//! for segment in &trajectory.segments {
//!     println!("{:?}: {} points", segment.gear, segment.points.len());
//! }
//! ```
//!
//! ## Coordinate Frames
//!
//! Planning happens in a local frame the caller establishes with
//! `translate_origin` and `rotate_angle`; obstacle boxes and the end pose are
//! given in that frame. The published trajectory is transformed back to the
//! world frame. Headings are counter-clockwise positive, normalized to
//! [-π, π].

pub mod config;
pub mod core;
pub mod error;
pub mod planning;
pub mod trajectory;

pub use config::{PlannerConfig, VehicleParams, WarmStartConfig};
pub use error::{PlanningError, Result};
pub use planning::{CollisionChecker, HybridAStar, HybridAStarResult, ReedShepp, ReedSheppPath};
pub use trajectory::{
    Gear, OpenSpaceTrajectoryGenerator, PartitionedTrajectory, PlanningRequest,
    TrajectoryPartitioner, TrajectoryPoint, TrajectorySegment, VehicleState, WarmStartDebug,
};
