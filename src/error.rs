//! Error taxonomy
//!
//! Collisions are not errors: they are reported through `FrameReport`.

use thiserror::Error;

/// Malformed tuning or obstacle catalog, surfaced once at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("obstacle catalog is empty")]
    EmptyCatalog,
    #[error("obstacle type `{name}` is invalid: {reason}")]
    InvalidObstacleType { name: String, reason: String },
    #[error("tuning value `{field}` is invalid: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("no obstacle type can spawn at the starting speed {speed}")]
    NoReachableObstacle { speed: f64 },
    #[error("failed to parse tuning overrides: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A state transition that is not allowed from the current state.
/// Rejected transitions leave all state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("character is already jumping")]
    AlreadyJumping,
    #[error("character cannot jump while ducking")]
    Ducking,
    #[error("run has crashed")]
    Crashed,
    #[error("run has not started")]
    NotStarted,
    #[error("game is paused")]
    Paused,
    #[error("a frame is still scheduled")]
    FrameInFlight,
    #[error("run has not crashed")]
    NotCrashed,
    #[error("restart requested {elapsed_ms}ms after crash, needs {required_ms}ms")]
    RestartTooSoon { elapsed_ms: u64, required_ms: u64 },
}

/// Obstacle type selection could not satisfy its constraints
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("no obstacle type is eligible at speed {speed} after {attempts} attempts")]
    Exhausted { attempts: u32, speed: f64 },
}

/// Best-distance persistence failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("best score store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("best score file is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
