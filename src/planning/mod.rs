//! Warm-start search: configuration-space nodes, Reeds-Shepp curves,
//! collision checking, and the Hybrid A* engine.

pub mod collision;
pub mod hybrid_a_star;
pub mod node;
pub mod reeds_shepp;

pub use collision::CollisionChecker;
pub use hybrid_a_star::{HybridAStar, HybridAStarResult};
pub use node::{GridIndex, Node3d, NodeId};
pub use reeds_shepp::{ReedShepp, ReedSheppPath, Segment};
