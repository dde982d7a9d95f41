//! Trajectory partitioning and the end-to-end generation pipeline.

pub mod generator;
pub mod partition;

pub use generator::{
    ObstaclePolytopes, OpenSpaceTrajectoryGenerator, PlanningRequest, VehicleState, WarmStartDebug,
};
pub use partition::{
    Gear, PartitionedTrajectory, TrajectoryPartitioner, TrajectoryPoint, TrajectorySegment,
};
