//! Angular arithmetic shared by the planner and the curve generator.

use std::f64::consts::PI;

/// Normalize an angle to [-π, π].
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Shortest signed angular difference from `a` to `b`.
#[inline]
pub fn angle_diff(a: f64, b: f64) -> f64 {
    normalize_angle(b - a)
}

/// `acos` with the argument clamped to [-1, 1].
///
/// Closed-form curve solutions can push the argument marginally outside the
/// domain through floating-point roundoff; the clamp keeps those solutions
/// real instead of NaN.
#[inline]
pub fn safe_acos(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos()
}

/// `asin` with the argument clamped to [-1, 1].
#[inline]
pub fn safe_asin(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin()
}
