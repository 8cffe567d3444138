//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only arrives as a `dt_ms` argument
//! - Seeded RNG only
//! - Obstacles kept in spawn (and therefore x) order
//! - No rendering, clock or persistence dependencies

pub mod character;
pub mod collision;
pub mod generator;
pub mod geometry;
pub mod horizon;
pub mod obstacle;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use character::{Character, CharacterConfig, CharacterStatus};
pub use collision::{Collision, check_for_collision};
pub use generator::{GenerationRules, ObstacleGenerator};
pub use geometry::CollisionBox;
pub use horizon::{Cloud, CloudConfig, Horizon, HorizonLine, HorizonLineConfig, Terrain};
pub use obstacle::{Altitude, Obstacle, ObstacleAnimation, ObstacleType};
pub use scheduler::{FrameHandle, FrameScheduler};
pub use state::{GameEvent, GamePhase, GameState, NightCycle};
pub use tick::{FrameReport, InputEvent, advance_frame, apply_input};
