//! Shortest Reeds-Shepp curves between oriented poses.
//!
//! A Reeds-Shepp curve is the shortest path for a bounded-curvature vehicle
//! that may reverse, composed of circular arcs at the minimum turning radius
//! and straight segments. The generator enumerates the 48-word family
//! (12 base words under timeflip and reflect transforms), solves each word in
//! closed form, and densifies the shortest feasible one at the configured
//! step size.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::config::{VehicleParams, WarmStartConfig};
use crate::core::math::{normalize_angle, safe_acos, safe_asin};
use crate::core::Pose2D;

/// One maneuver segment of a Reeds-Shepp word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Straight line.
    Straight,
    /// Arc turning left at minimum radius.
    Left,
    /// Arc turning right at minimum radius.
    Right,
}

impl Segment {
    /// Mirror left and right turns (the reflect transform).
    #[inline]
    fn mirrored(self) -> Segment {
        match self {
            Segment::Left => Segment::Right,
            Segment::Right => Segment::Left,
            Segment::Straight => Segment::Straight,
        }
    }
}

/// A densified Reeds-Shepp curve.
///
/// Segment lengths are signed: negative means the segment is driven in
/// reverse gear. Sample sequences start at the query's start pose and end at
/// its goal pose.
#[derive(Clone, Debug, Default)]
pub struct ReedSheppPath {
    /// Sampled x positions in meters.
    pub xs: Vec<f64>,
    /// Sampled y positions in meters.
    pub ys: Vec<f64>,
    /// Sampled headings in radians.
    pub phis: Vec<f64>,
    /// Maneuver type of each segment.
    pub segs_types: Vec<Segment>,
    /// Signed arc length of each segment in meters.
    pub segs_lengths: Vec<f64>,
    /// Total unsigned arc length in meters.
    pub total_length: f64,
}

/// A candidate word in unit-curvature space.
#[derive(Clone, Debug)]
struct Word {
    lengths: Vec<f64>,
    types: Vec<Segment>,
}

impl Word {
    fn new(lengths: Vec<f64>, types: Vec<Segment>) -> Self {
        debug_assert_eq!(lengths.len(), types.len());
        Self { lengths, types }
    }

    fn total(&self) -> f64 {
        self.lengths.iter().map(|l| l.abs()).sum()
    }

    fn is_finite(&self) -> bool {
        self.lengths.iter().all(|l| l.is_finite())
    }
}

/// Generator of shortest Reeds-Shepp curves for a fixed vehicle.
pub struct ReedShepp {
    /// Maximum curvature, the reciprocal of the minimum turning radius.
    max_kappa: f64,
    /// Arc-length sampling step in meters.
    step_size: f64,
}

impl ReedShepp {
    /// Create a generator from vehicle limits and the search step size.
    pub fn new(vehicle: &VehicleParams, config: &WarmStartConfig) -> Self {
        Self {
            max_kappa: 1.0 / vehicle.min_turning_radius(),
            step_size: config.step_size,
        }
    }

    /// Shortest Reeds-Shepp curve from `start` to `goal`.
    ///
    /// Returns `None` only on numerical failure of every word in the family;
    /// callers treat that as non-fatal unless start and goal are the search
    /// endpoints.
    pub fn shortest_rsp(&self, start: &Pose2D, goal: &Pose2D) -> Option<ReedSheppPath> {
        let dx = goal.x - start.x;
        let dy = goal.y - start.y;
        let (sin0, cos0) = start.phi.sin_cos();
        // Goal expressed in the start frame, scaled to unit turning radius.
        let x = (cos0 * dx + sin0 * dy) * self.max_kappa;
        let y = (-sin0 * dx + cos0 * dy) * self.max_kappa;
        let phi = normalize_angle(goal.phi - start.phi);

        let best = candidate_words(x, y, phi)
            .into_iter()
            .filter(Word::is_finite)
            .min_by(|a, b| {
                a.total()
                    .partial_cmp(&b.total())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;
        Some(self.densify(&best, start))
    }

    /// Sample a chosen word at uniform arc-length spacing.
    fn densify(&self, word: &Word, start: &Pose2D) -> ReedSheppPath {
        // Zero-length filler segments would distort gear bookkeeping; drop
        // them unless the whole word is degenerate (start equals goal).
        let mut lengths = Vec::with_capacity(word.lengths.len());
        let mut types = Vec::with_capacity(word.types.len());
        for (&len, &seg) in word.lengths.iter().zip(&word.types) {
            if len.abs() > 1e-9 {
                lengths.push(len);
                types.push(seg);
            }
        }
        if lengths.is_empty() {
            lengths = word.lengths.clone();
            types = word.types.clone();
        }

        let unit_step = self.step_size * self.max_kappa;
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        let mut phis = Vec::new();

        let mut origin_x = 0.0;
        let mut origin_y = 0.0;
        let mut origin_yaw = 0.0;
        for (i, (&length, &seg)) in lengths.iter().zip(&types).enumerate() {
            // Segment starts coincide with the previous segment's end; only
            // the very first segment emits its own start sample.
            for dist in sample_dists(length, unit_step, i == 0) {
                let (x, y, yaw) =
                    interpolate(dist, seg, self.max_kappa, origin_x, origin_y, origin_yaw);
                xs.push(x);
                ys.push(y);
                phis.push(yaw);
            }
            origin_x = *xs.last().unwrap();
            origin_y = *ys.last().unwrap();
            origin_yaw = *phis.last().unwrap();
        }

        // Local course to global frame.
        let (sin0, cos0) = start.phi.sin_cos();
        for i in 0..xs.len() {
            let (lx, ly) = (xs[i], ys[i]);
            xs[i] = cos0 * lx - sin0 * ly + start.x;
            ys[i] = sin0 * lx + cos0 * ly + start.y;
            phis[i] = normalize_angle(phis[i] + start.phi);
        }

        let segs_lengths: Vec<f64> = lengths.iter().map(|l| l / self.max_kappa).collect();
        let total_length = segs_lengths.iter().map(|l| l.abs()).sum();
        ReedSheppPath {
            xs,
            ys,
            phis,
            segs_types: types,
            segs_lengths,
            total_length,
        }
    }
}

/// Signed sample offsets covering one segment, endpoint included.
fn sample_dists(length: f64, step: f64, include_start: bool) -> Vec<f64> {
    let mut dists = Vec::new();
    if include_start {
        dists.push(0.0);
    }
    let dir = if length >= 0.0 { step } else { -step };
    let mut d = dir;
    while (length >= 0.0 && d < length) || (length < 0.0 && d > length) {
        dists.push(d);
        d += dir;
    }
    dists.push(length);
    dists
}

/// Pose reached after driving `dist` (signed, unit curvature) along one
/// segment from the given local origin.
fn interpolate(
    dist: f64,
    seg: Segment,
    max_kappa: f64,
    origin_x: f64,
    origin_y: f64,
    origin_yaw: f64,
) -> (f64, f64, f64) {
    let (sin_yaw, cos_yaw) = origin_yaw.sin_cos();
    match seg {
        Segment::Straight => (
            origin_x + dist / max_kappa * cos_yaw,
            origin_y + dist / max_kappa * sin_yaw,
            origin_yaw,
        ),
        Segment::Left => {
            let ldx = dist.sin() / max_kappa;
            let ldy = (1.0 - dist.cos()) / max_kappa;
            (
                origin_x + cos_yaw * ldx - sin_yaw * ldy,
                origin_y + sin_yaw * ldx + cos_yaw * ldy,
                origin_yaw + dist,
            )
        }
        Segment::Right => {
            let ldx = dist.sin() / max_kappa;
            let ldy = -(1.0 - dist.cos()) / max_kappa;
            (
                origin_x + cos_yaw * ldx - sin_yaw * ldy,
                origin_y + sin_yaw * ldx + cos_yaw * ldy,
                origin_yaw - dist,
            )
        }
    }
}

/// All 48 candidate words: the 12 base words under identity, timeflip,
/// reflect, and their composition.
fn candidate_words(x: f64, y: f64, phi: f64) -> Vec<Word> {
    let mut words = Vec::with_capacity(48);

    for solver in BASE_WORDS {
        if let Some(word) = solver(x, y, phi) {
            words.push(word);
        }
        // Timeflip: reverse traversal of the mirrored-in-time problem.
        if let Some(mut word) = solver(-x, y, -phi) {
            for len in &mut word.lengths {
                *len = -*len;
            }
            words.push(word);
        }
        // Reflect: mirror across the x axis swaps left and right turns.
        if let Some(mut word) = solver(x, -y, -phi) {
            for seg in &mut word.types {
                *seg = seg.mirrored();
            }
            words.push(word);
        }
        // Timeflip and reflect combined.
        if let Some(mut word) = solver(-x, -y, phi) {
            for len in &mut word.lengths {
                *len = -*len;
            }
            for seg in &mut word.types {
                *seg = seg.mirrored();
            }
            words.push(word);
        }
    }
    words
}

type WordSolver = fn(f64, f64, f64) -> Option<Word>;

const BASE_WORDS: [WordSolver; 12] = [
    lsl,
    lsr,
    l_xr_xl,
    l_xr_l,
    l_r_xl,
    l_r_xl_xr,
    l_xr_l_xr,
    l_xr90_s_l,
    l_s_r90_xl,
    l_xr90_s_r,
    l_s_l90_xr,
    l_xr90_s_l90_xr,
];

#[inline]
fn polar(x: f64, y: f64) -> (f64, f64) {
    ((x * x + y * y).sqrt(), y.atan2(x))
}

/// L+ S+ L+
fn lsl(x: f64, y: f64, phi: f64) -> Option<Word> {
    let (u, t) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if (0.0..=PI).contains(&t) {
        let v = normalize_angle(phi - t);
        if (0.0..=PI).contains(&v) {
            return Some(Word::new(
                vec![t, u, v],
                vec![Segment::Left, Segment::Straight, Segment::Left],
            ));
        }
    }
    None
}

/// L+ S+ R+
fn lsr(x: f64, y: f64, phi: f64) -> Option<Word> {
    let (u1, t1) = polar(x + phi.sin(), y - 1.0 - phi.cos());
    let u1_sq = u1 * u1;
    if u1_sq >= 4.0 {
        let u = (u1_sq - 4.0).sqrt();
        let theta = 2.0f64.atan2(u);
        let t = normalize_angle(t1 + theta);
        let v = normalize_angle(t - phi);
        if t >= 0.0 && v >= 0.0 {
            return Some(Word::new(
                vec![t, u, v],
                vec![Segment::Left, Segment::Straight, Segment::Right],
            ));
        }
    }
    None
}

/// L+ R- L+
fn l_xr_xl(x: f64, y: f64, phi: f64) -> Option<Word> {
    let (u1, theta) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if u1 <= 4.0 {
        let a = safe_acos(0.25 * u1);
        let t = normalize_angle(a + theta + FRAC_PI_2);
        let u = normalize_angle(PI - 2.0 * a);
        let v = normalize_angle(phi - t - u);
        return Some(Word::new(
            vec![t, -u, v],
            vec![Segment::Left, Segment::Right, Segment::Left],
        ));
    }
    None
}

/// L+ R- L-
fn l_xr_l(x: f64, y: f64, phi: f64) -> Option<Word> {
    let (u1, theta) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if u1 <= 4.0 {
        let a = safe_acos(0.25 * u1);
        let t = normalize_angle(a + theta + FRAC_PI_2);
        let u = normalize_angle(PI - 2.0 * a);
        let v = normalize_angle(-phi + t + u);
        return Some(Word::new(
            vec![t, -u, -v],
            vec![Segment::Left, Segment::Right, Segment::Left],
        ));
    }
    None
}

/// L+ R+ L-
fn l_r_xl(x: f64, y: f64, phi: f64) -> Option<Word> {
    let (u1, theta) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if u1 <= 4.0 {
        let u = safe_acos(1.0 - u1 * u1 * 0.125);
        let a = safe_asin(2.0 * u.sin() / u1);
        let t = normalize_angle(-a + theta + FRAC_PI_2);
        let v = normalize_angle(t - u - phi);
        return Some(Word::new(
            vec![t, u, -v],
            vec![Segment::Left, Segment::Right, Segment::Left],
        ));
    }
    None
}

/// L+ R+ L- R-
fn l_r_xl_xr(x: f64, y: f64, phi: f64) -> Option<Word> {
    let (u1, theta) = polar(x + phi.sin(), y - 1.0 - phi.cos());
    if u1 <= 2.0 {
        let a = safe_acos((u1 + 2.0) * 0.25);
        let t = normalize_angle(theta + a + FRAC_PI_2);
        let u = normalize_angle(a);
        let v = normalize_angle(phi - t + 2.0 * u);
        if t >= 0.0 && u >= 0.0 && v >= 0.0 {
            return Some(Word::new(
                vec![t, u, -u, -v],
                vec![Segment::Left, Segment::Right, Segment::Left, Segment::Right],
            ));
        }
    }
    None
}

/// L+ R- L- R+
fn l_xr_l_xr(x: f64, y: f64, phi: f64) -> Option<Word> {
    let (u1, theta) = polar(x + phi.sin(), y - 1.0 - phi.cos());
    let u2 = (20.0 - u1 * u1) / 16.0;
    if (0.0..=1.0).contains(&u2) {
        let u = safe_acos(u2);
        let a = safe_asin(2.0 * u.sin() / u1);
        let t = normalize_angle(theta + a + FRAC_PI_2);
        let v = normalize_angle(t - phi);
        if t >= 0.0 && v >= 0.0 {
            return Some(Word::new(
                vec![t, -u, -u, v],
                vec![Segment::Left, Segment::Right, Segment::Left, Segment::Right],
            ));
        }
    }
    None
}

/// L+ R-90 S- L-
fn l_xr90_s_l(x: f64, y: f64, phi: f64) -> Option<Word> {
    let (u1, theta) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if u1 >= 2.0 {
        let u = (u1 * u1 - 4.0).sqrt() - 2.0;
        let a = 2.0f64.atan2((u1 * u1 - 4.0).sqrt());
        let t = normalize_angle(theta + a + FRAC_PI_2);
        let v = normalize_angle(t - phi + FRAC_PI_2);
        if t >= 0.0 && v >= 0.0 {
            return Some(Word::new(
                vec![t, -FRAC_PI_2, -u, -v],
                vec![Segment::Left, Segment::Right, Segment::Straight, Segment::Left],
            ));
        }
    }
    None
}

/// L+ S+ R+90 L-
fn l_s_r90_xl(x: f64, y: f64, phi: f64) -> Option<Word> {
    let (u1, theta) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if u1 >= 2.0 {
        let u = (u1 * u1 - 4.0).sqrt() - 2.0;
        let a = (u1 * u1 - 4.0).sqrt().atan2(2.0);
        let t = normalize_angle(theta - a + FRAC_PI_2);
        let v = normalize_angle(t - phi - FRAC_PI_2);
        if t >= 0.0 && v >= 0.0 {
            return Some(Word::new(
                vec![t, u, FRAC_PI_2, -v],
                vec![Segment::Left, Segment::Straight, Segment::Right, Segment::Left],
            ));
        }
    }
    None
}

/// L+ R-90 S- R-
fn l_xr90_s_r(x: f64, y: f64, phi: f64) -> Option<Word> {
    let (u1, theta) = polar(x + phi.sin(), y - 1.0 - phi.cos());
    if u1 >= 2.0 {
        let t = normalize_angle(theta + FRAC_PI_2);
        let u = u1 - 2.0;
        let v = normalize_angle(phi - t - FRAC_PI_2);
        if t >= 0.0 && v >= 0.0 {
            return Some(Word::new(
                vec![t, -FRAC_PI_2, -u, -v],
                vec![Segment::Left, Segment::Right, Segment::Straight, Segment::Right],
            ));
        }
    }
    None
}

/// L+ S+ L+90 R-
fn l_s_l90_xr(x: f64, y: f64, phi: f64) -> Option<Word> {
    let (u1, theta) = polar(x + phi.sin(), y - 1.0 - phi.cos());
    if u1 >= 2.0 {
        let t = normalize_angle(theta);
        let u = u1 - 2.0;
        let v = normalize_angle(phi - t - FRAC_PI_2);
        if t >= 0.0 && v >= 0.0 {
            return Some(Word::new(
                vec![t, u, FRAC_PI_2, -v],
                vec![Segment::Left, Segment::Straight, Segment::Left, Segment::Right],
            ));
        }
    }
    None
}

/// L+ R-90 S- L-90 R+
fn l_xr90_s_l90_xr(x: f64, y: f64, phi: f64) -> Option<Word> {
    let (u1, theta) = polar(x + phi.sin(), y - 1.0 - phi.cos());
    if u1 >= 4.0 {
        let u = (u1 * u1 - 4.0).sqrt() - 4.0;
        let a = 2.0f64.atan2((u1 * u1 - 4.0).sqrt());
        let t = normalize_angle(theta + a + FRAC_PI_2);
        let v = normalize_angle(t - phi);
        if t >= 0.0 && v >= 0.0 {
            return Some(Word::new(
                vec![t, -FRAC_PI_2, -u, -FRAC_PI_2, v],
                vec![
                    Segment::Left,
                    Segment::Right,
                    Segment::Straight,
                    Segment::Left,
                    Segment::Right,
                ],
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn generator() -> ReedShepp {
        let vehicle = VehicleParams {
            wheel_base: 2.85,
            max_steer_angle: 0.5,
            steer_ratio: 1.0,
            front_edge_to_center: 3.89,
            back_edge_to_center: 1.04,
            left_edge_to_center: 1.05,
            right_edge_to_center: 1.05,
        };
        let config = WarmStartConfig {
            next_node_num: 10,
            step_size: 0.5,
            xy_grid_resolution: 1.0,
            phi_grid_resolution: PI / 12.0,
            back_penalty: 5.0,
            gear_switch_penalty: 10.0,
            steer_penalty: 0.5,
            steer_change_penalty: 0.5,
            delta_t: 0.5,
        };
        ReedShepp::new(&vehicle, &config)
    }

    fn assert_reaches(path: &ReedSheppPath, start: &Pose2D, goal: &Pose2D) {
        assert_relative_eq!(path.xs[0], start.x, epsilon = 1e-6);
        assert_relative_eq!(path.ys[0], start.y, epsilon = 1e-6);
        assert_relative_eq!(path.phis[0], start.phi, epsilon = 1e-6);
        let last = path.xs.len() - 1;
        assert_relative_eq!(path.xs[last], goal.x, epsilon = 1e-6);
        assert_relative_eq!(path.ys[last], goal.y, epsilon = 1e-6);
        assert_relative_eq!(
            normalize_angle(path.phis[last] - goal.phi),
            0.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_straight_ahead_is_single_forward_segment() {
        let rs = generator();
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let goal = Pose2D::new(10.0, 0.0, 0.0);
        let path = rs.shortest_rsp(&start, &goal).unwrap();
        assert_eq!(path.segs_types, vec![Segment::Straight]);
        assert_eq!(path.segs_lengths.len(), 1);
        assert!(path.segs_lengths[0] > 0.0);
        assert_relative_eq!(path.total_length, 10.0, epsilon = 1e-6);
        assert_reaches(&path, &start, &goal);
    }

    #[test]
    fn test_straight_back_is_single_reverse_segment() {
        let rs = generator();
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let goal = Pose2D::new(-5.0, 0.0, 0.0);
        let path = rs.shortest_rsp(&start, &goal).unwrap();
        assert_eq!(path.segs_types, vec![Segment::Straight]);
        assert!(path.segs_lengths[0] < 0.0);
        assert_relative_eq!(path.total_length, 5.0, epsilon = 1e-6);
        assert_reaches(&path, &start, &goal);
    }

    #[test]
    fn test_reaches_goal_across_pose_grid() {
        let rs = generator();
        let start = Pose2D::new(1.0, -2.0, 0.3);
        for &(gx, gy, gphi) in &[
            (6.0, 4.0, 1.2),
            (-8.0, 3.0, -2.5),
            (2.0, 2.0, 3.0),
            (0.0, -7.0, 0.0),
            (-1.0, -1.5, -1.0),
            (12.0, 0.5, 0.3),
        ] {
            let goal = Pose2D::new(gx, gy, gphi);
            let path = rs
                .shortest_rsp(&start, &goal)
                .expect("family should solve finite poses");
            assert_reaches(&path, &start, &goal);
        }
    }

    #[test]
    fn test_degenerate_query_keeps_samples() {
        let rs = generator();
        let pose = Pose2D::new(3.0, -1.0, 0.7);
        let path = rs.shortest_rsp(&pose, &pose).unwrap();
        assert!(path.xs.len() >= 2);
        for i in 0..path.xs.len() {
            assert_relative_eq!(path.xs[i], pose.x, epsilon = 1e-9);
            assert_relative_eq!(path.ys[i], pose.y, epsilon = 1e-9);
        }
        assert_relative_eq!(path.total_length, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sampling_is_uniform() {
        let rs = generator();
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let goal = Pose2D::new(4.0, 6.0, 1.0);
        let path = rs.shortest_rsp(&start, &goal).unwrap();
        for i in 1..path.xs.len() {
            let dx = path.xs[i] - path.xs[i - 1];
            let dy = path.ys[i] - path.ys[i - 1];
            // Chord length never exceeds the arc-length step.
            assert!((dx * dx + dy * dy).sqrt() <= 0.5 + 1e-9);
        }
    }

    #[test]
    fn test_lateral_shift_needs_cusp() {
        // Pure lateral translation cannot be done in one gear; the shortest
        // word must contain segments of both signs.
        let rs = generator();
        let start = Pose2D::new(0.0, 3.0, 0.0);
        let goal = Pose2D::new(0.0, 0.0, 0.0);
        let path = rs.shortest_rsp(&start, &goal).unwrap();
        assert_reaches(&path, &start, &goal);
        let has_forward = path.segs_lengths.iter().any(|&l| l > 1e-9);
        let has_reverse = path.segs_lengths.iter().any(|&l| l < -1e-9);
        assert!(has_forward && has_reverse);
    }

    #[test]
    fn test_total_length_matches_segments() {
        let rs = generator();
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let goal = Pose2D::new(3.0, 3.0, FRAC_PI_2);
        let path = rs.shortest_rsp(&start, &goal).unwrap();
        let sum: f64 = path.segs_lengths.iter().map(|l| l.abs()).sum();
        assert_relative_eq!(path.total_length, sum, epsilon = 1e-12);
        assert_eq!(path.segs_types.len(), path.segs_lengths.len());
    }
}
