//! End-to-end planning scenarios.
//!
//! Exercises the full generator pipeline on reference maneuvers and checks
//! the universal trajectory invariants: collision freedom, bicycle-model
//! consistency, gear-consistent segments, and determinism.

use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};

use sarathi_plan::core::{Box2d, Bounds, Point2D, Pose2D};
use sarathi_plan::trajectory::ObstaclePolytopes;
use sarathi_plan::{
    Gear, HybridAStar, OpenSpaceTrajectoryGenerator, PartitionedTrajectory, PlannerConfig,
    PlanningError, PlanningRequest, VehicleParams, VehicleState, WarmStartConfig,
};

fn reference_config() -> PlannerConfig {
    PlannerConfig {
        vehicle: VehicleParams {
            wheel_base: 2.85,
            max_steer_angle: 0.5,
            steer_ratio: 1.0,
            front_edge_to_center: 3.89,
            back_edge_to_center: 1.04,
            left_edge_to_center: 1.05,
            right_edge_to_center: 1.05,
        },
        warm_start: WarmStartConfig {
            next_node_num: 10,
            step_size: 0.5,
            xy_grid_resolution: 1.0,
            phi_grid_resolution: PI / 12.0,
            back_penalty: 5.0,
            gear_switch_penalty: 10.0,
            steer_penalty: 0.5,
            steer_change_penalty: 0.5,
            delta_t: 0.5,
        },
    }
}

fn request(start: Pose2D, goal: Pose2D, obstacles: Vec<Box2d>) -> PlanningRequest {
    PlanningRequest {
        vehicle_state: VehicleState {
            x: start.x,
            y: start.y,
            heading: start.phi,
            linear_velocity: 0.0,
        },
        xy_bounds: [-50.0, 50.0, -50.0, 50.0],
        rotate_angle: 0.0,
        translate_origin: Point2D::new(0.0, 0.0),
        end_pose: [goal.x, goal.y, goal.phi, 0.0],
        obstacle_polytopes: ObstaclePolytopes::default(),
        obstacles,
    }
}

/// Invariant: no returned pose may put the vehicle footprint in overlap with
/// any input obstacle.
fn assert_collision_free(
    trajectory: &PartitionedTrajectory,
    vehicle: &VehicleParams,
    obstacles: &[Box2d],
) {
    for segment in &trajectory.segments {
        for point in &segment.points {
            let footprint = vehicle.bounding_box(&Pose2D::new(point.x, point.y, point.theta));
            for obstacle in obstacles {
                assert!(
                    !footprint.has_overlap(obstacle),
                    "footprint at ({:.2}, {:.2}, {:.2}) overlaps obstacle at ({:.2}, {:.2})",
                    point.x,
                    point.y,
                    point.theta,
                    obstacle.center.x,
                    obstacle.center.y
                );
            }
        }
    }
}

/// Invariant: every consecutive pose pair must be reachable by one
/// bicycle-model step of at most `step_size` under the steering limit.
fn assert_bicycle_consistent(trajectory: &PartitionedTrajectory, config: &PlannerConfig) {
    let step = config.warm_start.step_size;
    let max_turn_per_step =
        step * config.vehicle.max_steer().tan() / config.vehicle.wheel_base;
    let points: Vec<_> = trajectory
        .segments
        .iter()
        .flat_map(|s| s.points.iter())
        .collect();
    for pair in points.windows(2) {
        let dx = pair[1].x - pair[0].x;
        let dy = pair[1].y - pair[0].y;
        let chord = (dx * dx + dy * dy).sqrt();
        assert!(chord <= step + 1e-6, "sample spacing {chord} exceeds step");
        let mut dphi = pair[1].theta - pair[0].theta;
        while dphi > PI {
            dphi -= 2.0 * PI;
        }
        while dphi < -PI {
            dphi += 2.0 * PI;
        }
        assert!(
            dphi.abs() <= max_turn_per_step + 1e-6,
            "heading change {dphi} exceeds steering limit"
        );
    }
}

fn assert_gear_consistent(trajectory: &PartitionedTrajectory) {
    for segment in &trajectory.segments {
        for point in &segment.points {
            match segment.gear {
                Gear::Drive => assert!(point.v >= 0.0),
                Gear::Reverse => assert!(point.v <= 0.0),
            }
        }
    }
}

// ============================================================================
// Reference maneuvers
// ============================================================================

#[test]
fn straight_through_is_one_forward_segment() {
    let config = reference_config();
    let mut generator = OpenSpaceTrajectoryGenerator::new(&config).unwrap();
    let trajectory = generator
        .plan(&request(
            Pose2D::new(0.0, 0.0, 0.0),
            Pose2D::new(10.0, 0.0, 0.0),
            Vec::new(),
        ))
        .unwrap();

    assert_eq!(trajectory.segments.len(), 1);
    assert_eq!(trajectory.segments[0].gear, Gear::Drive);
    let points = &trajectory.segments[0].points;
    assert!((points[0].x - 0.0).abs() < 1e-9);
    assert!((points.last().unwrap().x - 10.0).abs() < 1e-6);
    for pair in points.windows(2) {
        assert!(pair[1].x >= pair[0].x, "x must be monotone on a straight run");
    }
    for point in points {
        assert!(point.theta.abs() < 1e-9);
    }
    assert_bicycle_consistent(&trajectory, &config);
}

#[test]
fn parallel_parking_reverses_gear() {
    let config = reference_config();
    let mut generator = OpenSpaceTrajectoryGenerator::new(&config).unwrap();
    let trajectory = generator
        .plan(&request(
            Pose2D::new(0.0, 3.0, 0.0),
            Pose2D::new(0.0, 0.0, 0.0),
            Vec::new(),
        ))
        .unwrap();

    assert!(
        trajectory.gear_switch_count() >= 1,
        "a pure lateral shift needs at least one reversal"
    );
    assert_gear_consistent(&trajectory);
    assert_bicycle_consistent(&trajectory, &config);
    let last = trajectory
        .segments
        .last()
        .unwrap()
        .points
        .last()
        .unwrap();
    assert!((last.x).abs() < 1e-6);
    assert!((last.y).abs() < 1e-6);
}

#[test]
fn obstructed_straight_deviates_around_box() {
    let config = reference_config();
    let obstacles = vec![Box2d::axis_aligned(Point2D::new(5.0, 0.0), 1.0, 1.0)];
    let mut generator = OpenSpaceTrajectoryGenerator::new(&config).unwrap();
    let trajectory = generator
        .plan(&request(
            Pose2D::new(0.0, 0.0, 0.0),
            Pose2D::new(10.0, 0.0, 0.0),
            obstacles.clone(),
        ))
        .unwrap();

    assert_collision_free(&trajectory, &config.vehicle, &obstacles);
    assert_gear_consistent(&trajectory);
    assert_bicycle_consistent(&trajectory, &config);
    let max_lateral = trajectory
        .segments
        .iter()
        .flat_map(|s| s.points.iter())
        .map(|p| p.y.abs())
        .fold(0.0f64, f64::max);
    assert!(
        max_lateral > 0.5,
        "path must leave the blocked centerline, deviated {max_lateral}"
    );
}

#[test]
fn full_wall_exhausts_search() {
    // Reduced envelope keeps exhaustion fast; semantics are unchanged.
    let config = reference_config();
    let mut req = request(
        Pose2D::new(-5.0, 0.0, 0.0),
        Pose2D::new(9.0, 0.0, 0.0),
        vec![Box2d::axis_aligned(Point2D::new(5.0, 0.0), 1.0, 20.0)],
    );
    req.xy_bounds = [-10.0, 10.0, -10.0, 10.0];
    let mut generator = OpenSpaceTrajectoryGenerator::new(&config).unwrap();
    assert_eq!(
        generator.plan(&req).unwrap_err(),
        PlanningError::SearchExhausted
    );
}

#[test]
fn start_inside_obstacle_fails_fast() {
    let config = reference_config();
    let mut generator = OpenSpaceTrajectoryGenerator::new(&config).unwrap();
    let err = generator
        .plan(&request(
            Pose2D::new(0.0, 0.0, 0.0),
            Pose2D::new(10.0, 0.0, 0.0),
            vec![Box2d::axis_aligned(Point2D::new(0.0, 0.0), 2.0, 2.0)],
        ))
        .unwrap_err();
    assert_eq!(err, PlanningError::StartCollision);
}

#[test]
fn in_flight_cancellation_aborts_search() {
    // A hopeless full-size problem keeps the search busy long enough for the
    // other thread to pull the flag.
    let config = reference_config();
    let mut generator = OpenSpaceTrajectoryGenerator::new(&config).unwrap();
    let stop = generator.stop_handle();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(1));
        stop.store(true, Ordering::Release);
    });
    let err = generator
        .plan(&request(
            Pose2D::new(-40.0, 0.0, 0.0),
            Pose2D::new(40.0, 0.0, 0.0),
            vec![Box2d::axis_aligned(Point2D::new(0.0, 0.0), 1.0, 100.0)],
        ))
        .unwrap_err();
    canceller.join().unwrap();
    assert_eq!(err, PlanningError::Cancelled);
}

// ============================================================================
// Boundary behaviors
// ============================================================================

#[test]
fn start_equal_to_goal_yields_one_segment() {
    let config = reference_config();
    let pose = Pose2D::new(1.0, -2.0, 0.3);
    let mut generator = OpenSpaceTrajectoryGenerator::new(&config).unwrap();
    let trajectory = generator.plan(&request(pose, pose, Vec::new())).unwrap();
    assert_eq!(trajectory.segments.len(), 1);
    for point in &trajectory.segments[0].points {
        assert!((point.x - pose.x).abs() < 1e-9);
        assert!((point.y - pose.y).abs() < 1e-9);
        assert!(point.v.abs() < 1e-9);
    }
}

#[test]
fn empty_obstacles_resolve_to_reeds_shepp_curve() {
    // With nothing in the way, the very first analytic expansion must fire
    // and the result is the Reeds-Shepp curve at step-size sampling.
    let config = reference_config();
    let mut planner = HybridAStar::new(&config);
    let stop = AtomicBool::new(false);
    let result = planner
        .plan(
            Pose2D::new(0.0, 0.0, 0.0),
            Pose2D::new(7.0, 5.0, 1.0),
            &Bounds::from_extents(-50.0, 50.0, -50.0, 50.0),
            &[],
            &stop,
        )
        .unwrap();

    let rs = sarathi_plan::ReedShepp::new(&config.vehicle, &config.warm_start);
    let curve = rs
        .shortest_rsp(&Pose2D::new(0.0, 0.0, 0.0), &Pose2D::new(7.0, 5.0, 1.0))
        .unwrap();
    assert_eq!(result.x.len(), curve.xs.len());
    for (a, b) in result.x.iter().zip(&curve.xs) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn two_primitive_planner_still_converges_unobstructed() {
    let mut config = reference_config();
    config.warm_start.next_node_num = 2;
    let mut generator = OpenSpaceTrajectoryGenerator::new(&config).unwrap();
    let trajectory = generator
        .plan(&request(
            Pose2D::new(0.0, 0.0, 0.0),
            Pose2D::new(12.0, 4.0, 0.5),
            Vec::new(),
        ))
        .unwrap();
    assert!(trajectory.total_points() >= 3);
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn identical_requests_produce_identical_trajectories() {
    let config = reference_config();
    let obstacles = vec![Box2d::axis_aligned(Point2D::new(5.0, 1.0), 1.5, 1.5)];
    let req = request(
        Pose2D::new(0.0, 0.0, 0.0),
        Pose2D::new(10.0, 4.0, 0.0),
        obstacles,
    );

    let mut generator_a = OpenSpaceTrajectoryGenerator::new(&config).unwrap();
    let mut generator_b = OpenSpaceTrajectoryGenerator::new(&config).unwrap();
    let first = generator_a.plan(&req).unwrap();
    let second = generator_b.plan(&req).unwrap();
    // And the same generator replanning must agree with itself.
    let third = generator_a.plan(&req).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, third);
}
