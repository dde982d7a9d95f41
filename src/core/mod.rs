//! Foundation types: angular math, poses, envelopes, and oriented boxes.

pub mod math;

mod bounds;
mod box2d;
mod pose;

pub use bounds::Bounds;
pub use box2d::Box2d;
pub use pose::{Point2D, Pose2D};
