//! Obstacle type descriptors and obstacle instances

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::CollisionBox;
use crate::error::ConfigError;
use crate::scroll_increment;

/// Vertical placement of an obstacle type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Altitude {
    /// Always spawns at this y
    Fixed(i32),
    /// One of these y positions, chosen uniformly at spawn
    Choice(Vec<i32>),
}

impl Altitude {
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        match self {
            Altitude::Fixed(y) => *y,
            Altitude::Choice(ys) => ys[rng.random_range(0..ys.len())],
        }
    }
}

/// Sprite animation for non-static obstacles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleAnimation {
    pub frame_count: u32,
    pub frame_duration_ms: f64,
}

/// Static catalog entry, shared by every obstacle of that kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleType {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub y_pos: Altitude,
    /// Base gap before the next obstacle, scaled by the gap coefficient
    pub min_gap: f64,
    /// Game speed required before this type may spawn
    pub min_speed: f64,
    /// Game speed required before groups larger than one may spawn
    pub multiple_speed: f64,
    #[serde(default)]
    pub animation: Option<ObstacleAnimation>,
    /// Extra speed relative to the ground (sign picked per instance)
    #[serde(default)]
    pub speed_offset: f64,
    pub collision_boxes: Vec<CollisionBox>,
}

impl ObstacleType {
    /// Reject descriptors that could not be spawned or collided with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidObstacleType {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(invalid("width and height must be positive"));
        }
        if self.collision_boxes.is_empty() {
            return Err(invalid("needs at least one collision box"));
        }
        if let Altitude::Choice(ys) = &self.y_pos {
            if ys.is_empty() {
                return Err(invalid("altitude choice list is empty"));
            }
        }
        if let Some(anim) = self.animation {
            if anim.frame_count == 0 || anim.frame_duration_ms <= 0.0 {
                return Err(invalid("animation needs frames and a positive frame duration"));
            }
        }
        if self.min_gap < 0.0 || self.min_speed < 0.0 {
            return Err(invalid("min_gap and min_speed must not be negative"));
        }
        Ok(())
    }

    /// The stock catalog: small cactus, large cactus, pterodactyl
    pub fn default_catalog() -> Vec<ObstacleType> {
        vec![
            ObstacleType {
                name: "CACTUS_SMALL".to_string(),
                width: 17,
                height: 35,
                y_pos: Altitude::Fixed(105),
                min_gap: 120.0,
                min_speed: 0.0,
                multiple_speed: 4.0,
                animation: None,
                speed_offset: 0.0,
                collision_boxes: vec![
                    CollisionBox::new(0, 7, 5, 27),
                    CollisionBox::new(4, 0, 6, 34),
                    CollisionBox::new(10, 4, 7, 14),
                ],
            },
            ObstacleType {
                name: "CACTUS_LARGE".to_string(),
                width: 25,
                height: 50,
                y_pos: Altitude::Fixed(90),
                min_gap: 120.0,
                min_speed: 0.0,
                multiple_speed: 7.0,
                animation: None,
                speed_offset: 0.0,
                collision_boxes: vec![
                    CollisionBox::new(0, 12, 7, 38),
                    CollisionBox::new(8, 0, 7, 49),
                    CollisionBox::new(13, 10, 10, 38),
                ],
            },
            ObstacleType {
                name: "PTERODACTYL".to_string(),
                width: 46,
                height: 40,
                y_pos: Altitude::Choice(vec![100, 75, 50]),
                min_gap: 150.0,
                min_speed: 8.5,
                multiple_speed: 999.0,
                animation: Some(ObstacleAnimation {
                    frame_count: 2,
                    frame_duration_ms: 1000.0 / 6.0,
                }),
                speed_offset: 0.8,
                collision_boxes: vec![
                    CollisionBox::new(15, 15, 16, 5),
                    CollisionBox::new(18, 21, 24, 6),
                    CollisionBox::new(2, 14, 4, 3),
                    CollisionBox::new(6, 10, 4, 7),
                    CollisionBox::new(10, 8, 6, 9),
                ],
            },
        ]
    }
}

/// Widest cluster the sprite sheet provides
pub const MAX_GROUP_SIZE: u32 = 3;

/// Parameters for spawning, resolved from tuning and the current speed
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext {
    pub speed: f64,
    pub gap_coefficient: f64,
    pub max_gap_coefficient: f64,
    pub max_group_size: u32,
    /// Right edge of the visible area
    pub view_width: i32,
}

/// Inclusive `[min, max]` gap for an obstacle of `width` at `speed`
pub fn gap_bounds(
    width: i32,
    type_min_gap: f64,
    speed: f64,
    gap_coefficient: f64,
    max_gap_coefficient: f64,
) -> (i32, i32) {
    let min_gap = (width as f64 * speed + type_min_gap * gap_coefficient).round();
    let max_gap = (min_gap * max_gap_coefficient).round();
    (min_gap as i32, max_gap as i32)
}

/// A spawned obstacle group
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub kind: Arc<ObstacleType>,
    /// Index of `kind` in the catalog
    pub type_index: usize,
    /// Number of units in the group (1..=3)
    pub size: u32,
    pub x_pos: i32,
    pub y_pos: i32,
    /// Scaled width: `kind.width * size`
    pub width: i32,
    /// Distance the next obstacle keeps from this one
    pub gap: i32,
    pub speed_offset: f64,
    pub current_frame: u32,
    pub timer: f64,
    pub remove: bool,
    pub following_obstacle_created: bool,
    /// Per-instance copy of the type's boxes, resized for the group
    pub collision_boxes: Vec<CollisionBox>,
}

impl Obstacle {
    /// Place an obstacle group without any randomness (gap 0, no speed offset)
    pub fn new(
        kind: Arc<ObstacleType>,
        type_index: usize,
        size: u32,
        x_pos: i32,
        y_pos: i32,
    ) -> Self {
        let size = size.max(1);
        let width = kind.width * size as i32;
        let mut collision_boxes = kind.collision_boxes.clone();

        // Groups stretch the centre box and push the right box to the far edge.
        if size > 1 && collision_boxes.len() >= 3 {
            collision_boxes[1].width =
                width - collision_boxes[0].width - collision_boxes[2].width;
            collision_boxes[2].x = width - collision_boxes[2].width;
        }

        Self {
            kind,
            type_index,
            size,
            x_pos,
            y_pos,
            width,
            gap: 0,
            speed_offset: 0.0,
            current_frame: 0,
            timer: 0.0,
            remove: false,
            following_obstacle_created: false,
            collision_boxes,
        }
    }

    /// Spawn just past the right edge with random group size, altitude and gap
    pub fn spawn<R: Rng + ?Sized>(
        kind: Arc<ObstacleType>,
        type_index: usize,
        ctx: &SpawnContext,
        rng: &mut R,
    ) -> Self {
        let mut size = rng.random_range(1..=ctx.max_group_size.clamp(1, MAX_GROUP_SIZE));
        if size > 1 && ctx.speed < kind.multiple_speed {
            size = 1;
        }

        let y_pos = kind.y_pos.pick(rng);
        let x_pos = ctx.view_width + kind.width;
        let mut obstacle = Self::new(kind, type_index, size, x_pos, y_pos);

        if obstacle.kind.speed_offset != 0.0 {
            obstacle.speed_offset = if rng.random_bool(0.5) {
                obstacle.kind.speed_offset
            } else {
                -obstacle.kind.speed_offset
            };
        }

        let (min_gap, max_gap) = gap_bounds(
            obstacle.width,
            obstacle.kind.min_gap,
            ctx.speed,
            ctx.gap_coefficient,
            ctx.max_gap_coefficient,
        );
        obstacle.gap = rng.random_range(min_gap..=max_gap.max(min_gap));
        obstacle
    }

    /// Scroll left and advance the animation
    pub fn update(&mut self, dt_ms: f64, speed: f64) {
        if self.remove {
            return;
        }

        self.x_pos = self
            .x_pos
            .saturating_sub(scroll_increment(speed + self.speed_offset, dt_ms));

        if let Some(anim) = self.kind.animation {
            self.timer += dt_ms;
            if self.timer >= anim.frame_duration_ms {
                self.current_frame = (self.current_frame + 1) % anim.frame_count;
                self.timer = 0.0;
            }
        }

        if !self.is_visible() {
            self.remove = true;
        }
    }

    /// Any part of the group is still right of x=0
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.x_pos.saturating_add(self.width) > 0
    }

    /// Outer bounds in world space
    pub fn bounds(&self) -> CollisionBox {
        CollisionBox::new(self.x_pos, self.y_pos, self.width, self.kind.height)
    }
}
