//! Character/obstacle collision detection
//!
//! Two phases: a cheap outer-bounds rejection, then a per-sub-box test over
//! the character's current pose boxes and the obstacle's instance boxes.

use super::character::Character;
use super::geometry::CollisionBox;
use super::obstacle::Obstacle;

/// The first pair of world-space sub-boxes found overlapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub character_box: CollisionBox,
    pub obstacle_box: CollisionBox,
}

/// Character outer bounds, inset for the 1px sprite border
pub fn character_outer_box(character: &Character) -> CollisionBox {
    CollisionBox::new(
        character.x_pos + 1,
        character.y_pos + 1,
        character.footprint_width() - 2,
        character.config.height - 1,
    )
}

/// Obstacle outer bounds, inset for the 1px sprite border
pub fn obstacle_outer_box(obstacle: &Obstacle) -> CollisionBox {
    CollisionBox::new(
        obstacle.x_pos + 1,
        obstacle.y_pos + 1,
        obstacle.width - 2,
        obstacle.kind.height - 2,
    )
}

/// Test one obstacle against the character
pub fn check_for_collision(obstacle: &Obstacle, character: &Character) -> Option<Collision> {
    let character_outer = character_outer_box(character);
    let obstacle_outer = obstacle_outer_box(obstacle);

    if !character_outer.overlaps(&obstacle_outer) {
        return None;
    }

    for local_character in character.collision_boxes() {
        let character_box = local_character.offset_by(&character_outer);
        for local_obstacle in &obstacle.collision_boxes {
            let obstacle_box = local_obstacle.offset_by(&obstacle_outer);
            if character_box.overlaps(&obstacle_box) {
                return Some(Collision {
                    character_box,
                    obstacle_box,
                });
            }
        }
    }

    None
}
