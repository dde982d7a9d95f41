//! Configuration for the open-space planner.
//!
//! Every warm-start parameter is a required input with no serde default; a
//! config file missing a field fails to load instead of planning with a
//! silently substituted value.

use serde::Deserialize;
use std::path::Path;

use crate::core::{Box2d, Point2D, Pose2D};
use crate::error::{PlanningError, Result};

/// Vehicle geometry and steering limits.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct VehicleParams {
    /// Distance between front and rear axles in meters.
    pub wheel_base: f64,

    /// Maximum steering-wheel angle in radians.
    pub max_steer_angle: f64,

    /// Steering-wheel to road-wheel ratio.
    pub steer_ratio: f64,

    /// Distance from the reference point to the front edge in meters.
    pub front_edge_to_center: f64,

    /// Distance from the reference point to the back edge in meters.
    pub back_edge_to_center: f64,

    /// Distance from the reference point to the left edge in meters.
    pub left_edge_to_center: f64,

    /// Distance from the reference point to the right edge in meters.
    pub right_edge_to_center: f64,
}

impl VehicleParams {
    /// Maximum road-wheel steering angle in radians.
    #[inline]
    pub fn max_steer(&self) -> f64 {
        self.max_steer_angle / self.steer_ratio
    }

    /// Minimum turning radius at full steering lock.
    #[inline]
    pub fn min_turning_radius(&self) -> f64 {
        self.wheel_base / self.max_steer().tan()
    }

    /// Vehicle footprint length (front plus back edge offsets).
    #[inline]
    pub fn length(&self) -> f64 {
        self.front_edge_to_center + self.back_edge_to_center
    }

    /// Vehicle footprint width (left plus right edge offsets).
    #[inline]
    pub fn width(&self) -> f64 {
        self.left_edge_to_center + self.right_edge_to_center
    }

    /// Oriented bounding box of the vehicle at `pose`.
    ///
    /// The box center is shifted from the reference point because the edge
    /// offsets need not be symmetric (the reference point is typically the
    /// rear-axle midpoint).
    pub fn bounding_box(&self, pose: &Pose2D) -> Box2d {
        let shift_lon = 0.5 * (self.front_edge_to_center - self.back_edge_to_center);
        let shift_lat = 0.5 * (self.left_edge_to_center - self.right_edge_to_center);
        let (sin_h, cos_h) = pose.phi.sin_cos();
        let center = Point2D::new(
            pose.x + shift_lon * cos_h - shift_lat * sin_h,
            pose.y + shift_lon * sin_h + shift_lat * cos_h,
        );
        Box2d::new(center, pose.phi, self.length(), self.width())
    }

    fn validate(&self) -> Result<()> {
        if self.wheel_base <= 0.0 {
            return Err(PlanningError::Config("wheel_base must be positive".into()));
        }
        if self.steer_ratio <= 0.0 {
            return Err(PlanningError::Config("steer_ratio must be positive".into()));
        }
        let max_steer = self.max_steer();
        if max_steer <= 0.0 || max_steer >= std::f64::consts::FRAC_PI_2 {
            return Err(PlanningError::Config(
                "effective road-wheel steering limit must be in (0, pi/2)".into(),
            ));
        }
        if self.length() <= 0.0 || self.width() <= 0.0 {
            return Err(PlanningError::Config(
                "vehicle edge offsets must describe a positive footprint".into(),
            ));
        }
        Ok(())
    }
}

/// Warm-start (Hybrid A*) search parameters.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct WarmStartConfig {
    /// Motion primitives per expansion, half forward and half reverse.
    pub next_node_num: usize,

    /// Arc-length sampling step along each primitive in meters.
    pub step_size: f64,

    /// Positional cell size for grid-index collapsing in meters.
    pub xy_grid_resolution: f64,

    /// Angular cell size for grid-index collapsing in radians.
    pub phi_grid_resolution: f64,

    /// Multiplier on reverse-segment arc length.
    pub back_penalty: f64,

    /// Fixed additive cost per gear switch.
    pub gear_switch_penalty: f64,

    /// Multiplier on steering magnitude per primitive.
    pub steer_penalty: f64,

    /// Multiplier on steering change between consecutive primitives.
    pub steer_change_penalty: f64,

    /// Nominal inter-sample time for velocity computation in seconds.
    pub delta_t: f64,
}

impl WarmStartConfig {
    fn validate(&self) -> Result<()> {
        if self.next_node_num < 2 || self.next_node_num % 2 != 0 {
            return Err(PlanningError::Config(
                "next_node_num must be an even number of at least 2".into(),
            ));
        }
        for (name, value) in [
            ("step_size", self.step_size),
            ("xy_grid_resolution", self.xy_grid_resolution),
            ("phi_grid_resolution", self.phi_grid_resolution),
            ("delta_t", self.delta_t),
        ] {
            if value <= 0.0 || !value.is_finite() {
                return Err(PlanningError::Config(format!("{name} must be positive")));
            }
        }
        for (name, value) in [
            ("back_penalty", self.back_penalty),
            ("gear_switch_penalty", self.gear_switch_penalty),
            ("steer_penalty", self.steer_penalty),
            ("steer_change_penalty", self.steer_change_penalty),
        ] {
            if value < 0.0 || !value.is_finite() {
                return Err(PlanningError::Config(format!("{name} must be non-negative")));
            }
        }
        Ok(())
    }
}

/// Full planner configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct PlannerConfig {
    pub vehicle: VehicleParams,
    pub warm_start: WarmStartConfig,
}

impl PlannerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlanningError::Config(format!("failed to read config file: {e}")))?;
        let config: PlannerConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check all parameters are in range.
    pub fn validate(&self) -> Result<()> {
        self.vehicle.validate()?;
        self.warm_start.validate()
    }
}
