//! Hybrid A* warm-start search over (x, y, heading).
//!
//! The search expands bicycle-model motion primitives over a quantized
//! configuration space, guided by a Reeds-Shepp cost-to-goal heuristic. On
//! every expansion it first attempts an analytic Reeds-Shepp connection to
//! the goal; the first collision-free connection ends the search. The
//! produced path is kinematically feasible but not smooth; downstream
//! optimizers treat it as a warm start.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use log::{debug, info};

use crate::config::{PlannerConfig, VehicleParams, WarmStartConfig};
use crate::core::math::{angle_diff, normalize_angle};
use crate::core::{Bounds, Box2d, Point2D, Pose2D};
use crate::error::{PlanningError, Result};
use crate::planning::collision::CollisionChecker;
use crate::planning::node::{Node3d, NodeId};
use crate::planning::reeds_shepp::{ReedShepp, ReedSheppPath, Segment};

/// Kinematic warm-start trajectory in the local planning frame.
///
/// Positions and headings have N+1 samples; `v` has N+1 samples with the
/// final one pinned to zero; `a` and `steer` have N samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HybridAStarResult {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub phi: Vec<f64>,
    pub v: Vec<f64>,
    pub a: Vec<f64>,
    pub steer: Vec<f64>,
}

impl HybridAStarResult {
    /// Horizon N, the number of control intervals.
    #[inline]
    pub fn horizon(&self) -> usize {
        self.x.len().saturating_sub(1)
    }
}

/// Priority-queue entry: grid key plus total cost, FIFO among equal costs.
struct HeapEntry {
    key: u64,
    cost: f64,
    seq: u64,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.seq == other.seq
    }
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior; earlier insertions win ties
        // so expansion order is reproducible.
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Hybrid A* search engine.
///
/// One instance is reusable across plan calls; every call starts from a
/// cleared search state.
pub struct HybridAStar {
    config: WarmStartConfig,
    vehicle: VehicleParams,
    rs: ReedShepp,
    max_steer: f64,

    nodes: Vec<Node3d>,
    open_set: HashMap<u64, NodeId>,
    closed_set: HashMap<u64, NodeId>,
    open_pq: BinaryHeap<HeapEntry>,
    rs_cache: HashMap<u64, ReedSheppPath>,
    final_node: Option<NodeId>,
    seq: u64,
}

impl HybridAStar {
    /// Create a planner from a validated configuration.
    pub fn new(config: &PlannerConfig) -> Self {
        Self {
            config: config.warm_start,
            vehicle: config.vehicle,
            rs: ReedShepp::new(&config.vehicle, &config.warm_start),
            max_steer: config.vehicle.max_steer(),
            nodes: Vec::new(),
            open_set: HashMap::new(),
            closed_set: HashMap::new(),
            open_pq: BinaryHeap::new(),
            rs_cache: HashMap::new(),
            final_node: None,
            seq: 0,
        }
    }

    /// Plan a trajectory from `start` to `goal` inside `bounds`.
    ///
    /// Obstacle boxes are in the same local frame as the poses and stay
    /// immutable for the duration of the call. The `stop` flag is consulted
    /// at the top of every search iteration for cooperative cancellation.
    pub fn plan(
        &mut self,
        start: Pose2D,
        goal: Pose2D,
        bounds: &Bounds,
        obstacles: &[Box2d],
        stop: &AtomicBool,
    ) -> Result<HybridAStarResult> {
        self.clear();
        if !bounds.is_valid() {
            return Err(PlanningError::InvalidInput(
                "planning envelope is degenerate".into(),
            ));
        }
        if !bounds.contains(start.point()) {
            return Err(PlanningError::InvalidInput(
                "start pose outside planning envelope".into(),
            ));
        }
        if !bounds.contains(goal.point()) {
            return Err(PlanningError::InvalidInput(
                "goal pose outside planning envelope".into(),
            ));
        }

        let checker = CollisionChecker::new(self.vehicle, obstacles);
        if !checker.is_pose_clear(&start) {
            return Err(PlanningError::StartCollision);
        }
        if !checker.is_pose_clear(&goal) {
            return Err(PlanningError::EndCollision);
        }

        let start_node = Node3d::from_pose(start, bounds, &self.config);
        let start_key = start_node.key();
        let start_id = self.push_node(start_node);

        // The start-to-goal curve doubles as the first heuristic entry and
        // the first analytic-expansion candidate; without it the plan cannot
        // proceed.
        let rs_path = self
            .rs
            .shortest_rsp(&start, &goal)
            .ok_or(PlanningError::RsGeneratorFailed)?;
        self.nodes[start_id].heu_cost = self.rsp_cost(&rs_path);
        self.rs_cache.insert(start_key, rs_path);
        self.open_set.insert(start_key, start_id);
        let start_cost = self.nodes[start_id].cost();
        self.push_queue(start_key, start_cost);

        let search_start = std::time::Instant::now();
        let mut explored = 0usize;
        loop {
            if stop.load(AtomicOrdering::Acquire) {
                debug!("[HybridAStar] cancelled after {} expansions", explored);
                return Err(PlanningError::Cancelled);
            }
            let Some(entry) = self.open_pq.pop() else {
                break;
            };
            // Lazy deletion: an index may have been closed since this entry
            // was pushed.
            let Some(&current_id) = self.open_set.get(&entry.key) else {
                continue;
            };

            if self.analytic_expansion(current_id, &checker, bounds) {
                break;
            }
            self.open_set.remove(&entry.key);
            self.closed_set.insert(entry.key, current_id);

            for i in 0..self.config.next_node_num {
                let Some(mut candidate) = self.next_node(current_id, i, bounds) else {
                    continue;
                };
                if !checker.is_path_clear(&candidate.xs, &candidate.ys, &candidate.phis) {
                    continue;
                }
                let candidate_key = candidate.key();
                if self.closed_set.contains_key(&candidate_key) {
                    continue;
                }
                if self.open_set.contains_key(&candidate_key) {
                    // Cost rewiring of already-open cells is intentionally
                    // left out; the first reach wins at this resolution.
                    continue;
                }
                let Some(rs_path) = self.rs.shortest_rsp(&candidate.pose(), &goal) else {
                    continue;
                };
                explored += 1;
                candidate.heu_cost = self.rsp_cost(&rs_path);
                candidate.traj_cost =
                    self.nodes[current_id].traj_cost + self.piecewise_cost(current_id, &candidate);
                let cost = candidate.cost();
                self.rs_cache.insert(candidate_key, rs_path);
                let id = self.push_node(candidate);
                self.open_set.insert(candidate_key, id);
                self.push_queue(candidate_key, cost);
            }
        }

        let final_id = self.final_node.ok_or(PlanningError::SearchExhausted)?;
        info!(
            "[HybridAStar] reached goal after {} expansions in {:.1?}",
            explored,
            search_start.elapsed()
        );
        self.extract_result(final_id)
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.open_set.clear();
        self.closed_set.clear();
        self.open_pq.clear();
        self.rs_cache.clear();
        self.final_node = None;
        self.seq = 0;
    }

    fn push_node(&mut self, node: Node3d) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn push_queue(&mut self, key: u64, cost: f64) {
        let seq = self.seq;
        self.seq += 1;
        self.open_pq.push(HeapEntry { key, cost, seq });
    }

    /// Try to close the gap to the goal with the cached Reeds-Shepp curve.
    ///
    /// On success the whole densified curve becomes the terminal node and the
    /// search ends.
    fn analytic_expansion(
        &mut self,
        current_id: NodeId,
        checker: &CollisionChecker,
        bounds: &Bounds,
    ) -> bool {
        let key = self.nodes[current_id].key();
        let (xs, ys, phis, rs_cost) = {
            let Some(path) = self.rs_cache.get(&key) else {
                return false;
            };
            let in_bounds = path
                .xs
                .iter()
                .zip(&path.ys)
                .all(|(&x, &y)| bounds.contains(Point2D::new(x, y)));
            if !in_bounds || !checker.is_path_clear(&path.xs, &path.ys, &path.phis) {
                return false;
            }
            (
                path.xs.clone(),
                path.ys.clone(),
                path.phis.clone(),
                self.rsp_cost(path),
            )
        };

        let mut terminal = Node3d::new(xs, ys, phis, bounds, &self.config);
        terminal.pred = Some(current_id);
        terminal.traj_cost = self.nodes[current_id].traj_cost + rs_cost;
        let id = self.push_node(terminal);
        self.final_node = Some(id);
        true
    }

    /// Generate the i-th motion primitive from a node.
    ///
    /// Returns `None` when any sample leaves the planning envelope; collision
    /// checking is the caller's job.
    fn next_node(&self, current_id: NodeId, i: usize, bounds: &Bounds) -> Option<Node3d> {
        let current = &self.nodes[current_id];
        let half = self.config.next_node_num / 2;
        let local_index = if i < half { i } else { i - half };
        let steering = if half > 1 {
            -self.max_steer + (2.0 * self.max_steer / (half as f64 - 1.0)) * local_index as f64
        } else {
            0.0
        };
        let traveled = if i < half {
            self.config.step_size
        } else {
            -self.config.step_size
        };

        let arc = std::f64::consts::SQRT_2 * self.config.xy_grid_resolution;
        let steps = (arc / self.config.step_size).ceil() as usize;
        let mut xs = Vec::with_capacity(steps + 1);
        let mut ys = Vec::with_capacity(steps + 1);
        let mut phis = Vec::with_capacity(steps + 1);
        xs.push(current.x);
        ys.push(current.y);
        phis.push(current.phi);

        let mut last_x = current.x;
        let mut last_y = current.y;
        let mut last_phi = current.phi;
        for _ in 0..steps {
            let next_x = last_x + traveled * last_phi.cos();
            let next_y = last_y + traveled * last_phi.sin();
            let next_phi = normalize_angle(
                last_phi + traveled / self.vehicle.wheel_base * steering.tan(),
            );
            if !bounds.contains(Point2D::new(next_x, next_y)) {
                return None;
            }
            xs.push(next_x);
            ys.push(next_y);
            phis.push(next_phi);
            last_x = next_x;
            last_y = next_y;
            last_phi = next_phi;
        }

        let mut node = Node3d::new(xs, ys, phis, bounds, &self.config);
        node.pred = Some(current_id);
        node.forward = traveled > 0.0;
        node.steering = steering;
        Some(node)
    }

    /// Edge cost of arriving at `next` from the current node.
    fn piecewise_cost(&self, current_id: NodeId, next: &Node3d) -> f64 {
        let current = &self.nodes[current_id];
        let mut cost = if next.forward {
            self.config.xy_grid_resolution
        } else {
            self.config.xy_grid_resolution * self.config.back_penalty
        };
        if current.forward != next.forward {
            cost += self.config.gear_switch_penalty;
        }
        cost += self.config.steer_penalty * next.steering.abs();
        cost += self.config.steer_change_penalty * (next.steering - current.steering).abs();
        cost
    }

    /// Cost of a Reeds-Shepp curve under the same penalty regime as the
    /// primitive edges, keeping the heuristic consistent with the search.
    fn rsp_cost(&self, path: &ReedSheppPath) -> f64 {
        let mut cost = 0.0;
        for &len in &path.segs_lengths {
            cost += if len > 0.0 {
                len
            } else {
                -len * self.config.back_penalty
            };
        }
        for pair in path.segs_lengths.windows(2) {
            if pair[0] * pair[1] < 0.0 {
                cost += self.config.gear_switch_penalty;
            }
        }
        let mut last_turn: Option<Segment> = None;
        for &seg in &path.segs_types {
            if seg == Segment::Straight {
                continue;
            }
            cost += self.config.steer_penalty * self.max_steer;
            if let Some(prev) = last_turn {
                if seg != prev {
                    cost += 2.0 * self.config.steer_change_penalty * self.max_steer;
                }
            }
            last_turn = Some(seg);
        }
        cost
    }

    /// Stitch predecessor segments into the final start-to-goal result and
    /// derive velocities, accelerations, and steering.
    fn extract_result(&self, final_id: NodeId) -> Result<HybridAStarResult> {
        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut phi = Vec::new();

        let mut current = &self.nodes[final_id];
        while let Some(pred) = current.pred {
            // Each node contributes its samples newest-first, minus the last
            // one (the predecessor's final pose, contributed by the
            // predecessor itself).
            let count = current.xs.len() - 1;
            x.extend(current.xs.iter().rev().take(count));
            y.extend(current.ys.iter().rev().take(count));
            phi.extend(current.phis.iter().rev().take(count));
            current = &self.nodes[pred];
        }
        x.push(current.x);
        y.push(current.y);
        phi.push(current.phi);
        x.reverse();
        y.reverse();
        phi.reverse();

        if x.len() < 2 {
            return Err(PlanningError::InvalidHorizon);
        }

        let n = x.len() - 1;
        let dt = self.config.delta_t;
        let mut v = Vec::with_capacity(n + 1);
        for i in 0..n {
            let discrete_v = ((x[i + 1] - x[i]) / dt) * phi[i].cos()
                + ((y[i + 1] - y[i]) / dt) * phi[i].sin();
            v.push(discrete_v);
        }
        v.push(0.0);

        let mut a = Vec::with_capacity(n);
        for i in 0..n {
            a.push((v[i + 1] - v[i]) / dt);
        }

        let mut steer = Vec::with_capacity(n);
        for i in 0..n {
            let turn = angle_diff(phi[i], phi[i + 1]) * self.vehicle.wheel_base
                / self.config.step_size;
            steer.push(if v[i] > 0.0 {
                turn.atan()
            } else {
                (-turn).atan()
            });
        }

        Ok(HybridAStarResult {
            x,
            y,
            phi,
            v,
            a,
            steer,
        })
    }
}
