//! Gear-aware trajectory partitioning.
//!
//! The warm-start path is a single kinematic sequence that may reverse
//! direction several times. Vehicle control consumes one trajectory per gear,
//! so the partitioner splits the sequence at every velocity sign change and
//! stamps each point with time, arc length, velocity, acceleration, and
//! curvature.

use serde::Serialize;

use crate::error::{PlanningError, Result};
use crate::planning::HybridAStarResult;

/// Velocity magnitudes below this threshold are treated as standstill when
/// classifying gears.
pub const GEAR_EPSILON: f64 = 1e-3;

/// Transmission direction of a trajectory segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Gear {
    /// Forward motion.
    Drive,
    /// Reverse motion.
    Reverse,
}

impl Gear {
    /// Sign convention of velocities and curvatures in this gear.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Gear::Drive => 1.0,
            Gear::Reverse => -1.0,
        }
    }
}

/// One stamped sample of the partitioned trajectory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    /// Time since the start of the whole trajectory in seconds.
    pub relative_time: f64,
    /// X position in meters.
    pub x: f64,
    /// Y position in meters.
    pub y: f64,
    /// Z position, always zero in the planar frame.
    pub z: f64,
    /// Heading in radians.
    pub theta: f64,
    /// Arc length accumulated across the whole trajectory in meters.
    pub s: f64,
    /// Signed velocity, negative in reverse gear.
    pub v: f64,
    /// Signed acceleration.
    pub a: f64,
    /// Signed curvature, flipped in reverse gear.
    pub kappa: f64,
}

/// A maximal run of trajectory points sharing one gear.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrajectorySegment {
    pub gear: Gear,
    pub points: Vec<TrajectoryPoint>,
}

/// The partitioned output of one plan call.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PartitionedTrajectory {
    /// Per-gear segments in driving order.
    pub segments: Vec<TrajectorySegment>,
}

impl PartitionedTrajectory {
    /// Number of gear reversals in the trajectory.
    #[inline]
    pub fn gear_switch_count(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    /// Total number of points across all segments.
    pub fn total_points(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }
}

/// Splits warm-start results into per-gear trajectories.
pub struct TrajectoryPartitioner {
    delta_t: f64,
    wheel_base: f64,
}

impl TrajectoryPartitioner {
    /// Create a partitioner from the sampling interval and wheel base.
    pub fn new(delta_t: f64, wheel_base: f64) -> Self {
        Self { delta_t, wheel_base }
    }

    /// Partition a warm-start result at its gear reversals.
    ///
    /// The initial gear is classified from the first three velocities; fewer
    /// than three samples, or a mixed-sign opening, cannot be classified and
    /// fail with [`PlanningError::InvalidHorizon`].
    pub fn partition(&self, result: &HybridAStarResult) -> Result<PartitionedTrajectory> {
        let n_points = result.x.len();
        if n_points < 3 {
            return Err(PlanningError::InvalidHorizon);
        }
        if result.y.len() != n_points
            || result.phi.len() != n_points
            || result.v.len() != n_points
            || result.a.len() + 1 != n_points
            || result.steer.len() + 1 != n_points
        {
            return Err(PlanningError::InvalidInput(
                "warm-start result vectors have inconsistent lengths".into(),
            ));
        }

        let mut gear = if result.v[..3].iter().all(|&v| v >= -GEAR_EPSILON) {
            Gear::Drive
        } else if result.v[..3].iter().all(|&v| v <= GEAR_EPSILON) {
            Gear::Reverse
        } else {
            return Err(PlanningError::InvalidHorizon);
        };

        let mut segments = Vec::new();
        let mut points: Vec<TrajectoryPoint> = Vec::new();
        let mut relative_time = 0.0;
        let mut s = 0.0;
        for i in 0..n_points {
            let v_i = result.v[i];
            if v_i < -GEAR_EPSILON && gear == Gear::Drive {
                segments.push(TrajectorySegment {
                    gear,
                    points: std::mem::take(&mut points),
                });
                gear = Gear::Reverse;
            } else if v_i > GEAR_EPSILON && gear == Gear::Reverse {
                segments.push(TrajectorySegment {
                    gear,
                    points: std::mem::take(&mut points),
                });
                gear = Gear::Drive;
            }

            if i > 0 {
                let dx = result.x[i] - result.x[i - 1];
                let dy = result.y[i] - result.y[i - 1];
                s += (dx * dx + dy * dy).sqrt();
            }
            // The last point has no control interval of its own and reuses
            // the final one.
            let ctrl = i.min(result.a.len() - 1);
            let sign = gear.sign();
            points.push(TrajectoryPoint {
                relative_time,
                x: result.x[i],
                y: result.y[i],
                z: 0.0,
                theta: result.phi[i],
                s,
                v: v_i.abs() * sign,
                a: result.a[ctrl],
                kappa: result.steer[ctrl].tan() / self.wheel_base * sign,
            });
            relative_time += self.delta_t;
        }
        segments.push(TrajectorySegment { gear, points });

        Ok(PartitionedTrajectory { segments })
    }
}
