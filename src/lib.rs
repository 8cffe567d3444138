//! Dino Runner - An endless side-scrolling runner
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (obstacles, horizon, character physics, collisions)
//! - `renderer`: Sprite rectangle computation for an external drawing surface
//! - `platform`: Clock abstraction
//! - `persistence`: Best distance storage
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, GenerationError, StoreError, TransitionError};
pub use session::Session;
pub use tuning::{Preset, Tuning, TuningOverrides};

/// Game configuration constants
pub mod consts {
    /// Reference frame rate the tuning values are expressed against
    pub const FPS: f64 = 60.0;
    /// Milliseconds per reference frame
    pub const MS_PER_FRAME: f64 = 1000.0 / FPS;
    /// Longest frame delta the simulation accepts (host stalls are truncated)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Default canvas dimensions
    pub const DEFAULT_WIDTH: i32 = 600;
    pub const DEFAULT_HEIGHT: i32 = 150;
}

/// Pixels scrolled in `dt_ms` at `speed` (speed is px per reference frame)
#[inline]
pub fn scroll_increment(speed: f64, dt_ms: f64) -> i32 {
    (speed * (consts::FPS / 1000.0) * dt_ms).floor() as i32
}
