//! Error types for sarathi-plan.

use thiserror::Error;

/// Planning error type.
///
/// Every variant is terminal to the current plan call; nothing is retried
/// internally and no partial trajectory is ever returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanningError {
    /// Start or end pose violates the planning envelope, or the request is
    /// internally inconsistent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Vehicle bounding box at the start pose overlaps an obstacle.
    #[error("start pose in collision with obstacles")]
    StartCollision,

    /// Vehicle bounding box at the end pose overlaps an obstacle.
    #[error("end pose in collision with obstacles")]
    EndCollision,

    /// No Reeds-Shepp curve could be constructed from start to goal.
    #[error("Reeds-Shepp generation failed between start and goal")]
    RsGeneratorFailed,

    /// The open set ran out before the goal was reached.
    #[error("search exhausted without reaching the goal")]
    SearchExhausted,

    /// Too few samples to differentiate velocities or classify the initial
    /// gear.
    #[error("trajectory horizon too short to partition")]
    InvalidHorizon,

    /// Cooperative stop was requested during the search.
    #[error("planning cancelled")]
    Cancelled,

    /// Configuration failed to load or validate.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for PlanningError {
    fn from(e: toml::de::Error) -> Self {
        PlanningError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlanningError>;
