//! Sprite rectangle computation
//!
//! The core never touches pixels. Each frame it hands the host's drawing
//! surface a source rectangle in the sprite sheet and a destination
//! rectangle on the canvas for every visible entity.

pub mod sprites;

pub use sprites::{SpritePos, SpriteSheet};

use crate::sim::character::{Character, CharacterStatus};
use crate::sim::horizon::{Cloud, CloudConfig, HorizonLine, Terrain};
use crate::sim::obstacle::Obstacle;
use crate::sim::state::GameState;

/// Pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// What is being drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteId<'a> {
    Character(CharacterStatus),
    /// Obstacle type name
    Obstacle(&'a str),
    HorizonLine(Terrain),
    Cloud,
}

/// Host drawing surface
pub trait SpriteSink {
    fn draw_sprite(&mut self, sprite: SpriteId<'_>, source: Rect, dest: Rect);
}

/// Sprite x offsets (standard density) of each status' animation frames
pub fn character_frames(status: CharacterStatus) -> &'static [i32] {
    match status {
        CharacterStatus::Waiting => &[44, 0],
        CharacterStatus::Running => &[88, 132],
        CharacterStatus::Crashed => &[220],
        CharacterStatus::Jumping => &[0],
        CharacterStatus::Ducking => &[264, 323],
    }
}

/// Draw every visible entity, back to front
pub fn draw_frame(state: &GameState, sheet: &SpriteSheet, sink: &mut impl SpriteSink) {
    let view_width = state.tuning.width;

    for cloud in &state.horizon.clouds {
        draw_cloud(cloud, &state.horizon.cloud_config, view_width, sheet, sink);
    }
    draw_horizon_line(&state.horizon.line, sheet, sink);
    for obstacle in state.horizon.obstacles() {
        if obstacle.x_pos < view_width && obstacle.is_visible() {
            draw_obstacle(obstacle, sheet, sink);
        }
    }
    draw_character(&state.character, sheet, sink);
}

pub fn draw_character(character: &Character, sheet: &SpriteSheet, sink: &mut impl SpriteSink) {
    let frames = character_frames(character.status);
    // Idle character keeps its eyes open until a blink is due
    let frame = if character.status == CharacterStatus::Waiting && !character.is_blinking() {
        0
    } else {
        frames[character.current_frame as usize % frames.len()]
    };

    let width = character.footprint_width();
    let height = character.config.height;
    let s = sheet.scale;
    let source = Rect::new(
        frame * s + sheet.character.x,
        sheet.character.y,
        width * s,
        height * s,
    );
    let dest = Rect::new(character.x_pos, character.y_pos, width, height);
    sink.draw_sprite(SpriteId::Character(character.status), source, dest);
}

pub fn draw_obstacle(obstacle: &Obstacle, sheet: &SpriteSheet, sink: &mut impl SpriteSink) {
    let Some(sprite) = sheet.obstacle(&obstacle.kind.name) else {
        log::debug!("No sprite for obstacle type {}", obstacle.kind.name);
        return;
    };

    let s = sheet.scale;
    let unit_width = obstacle.kind.width * s;
    let size = obstacle.size as i32;
    // Groups are laid out 1, 2, 3 wide after one another in the sheet
    let mut source_x = unit_width * size * (size - 1) / 2 + sprite.x;
    if obstacle.current_frame > 0 {
        source_x += unit_width * obstacle.current_frame as i32;
    }

    let source = Rect::new(source_x, sprite.y, unit_width * size, obstacle.kind.height * s);
    let dest = Rect::new(
        obstacle.x_pos,
        obstacle.y_pos,
        obstacle.width,
        obstacle.kind.height,
    );
    sink.draw_sprite(SpriteId::Obstacle(&obstacle.kind.name), source, dest);
}

pub fn draw_horizon_line(line: &HorizonLine, sheet: &SpriteSheet, sink: &mut impl SpriteSink) {
    let s = sheet.scale;
    let (width, height) = (line.config.width, line.config.height);
    for (x_pos, terrain) in line.x_pos.iter().zip(line.terrain) {
        let bump_offset = match terrain {
            Terrain::Flat => 0,
            Terrain::Bumpy => width * s,
        };
        let source = Rect::new(
            sheet.horizon.x + bump_offset,
            sheet.horizon.y,
            width * s,
            height * s,
        );
        let dest = Rect::new(*x_pos, line.config.y_pos, width, height);
        sink.draw_sprite(SpriteId::HorizonLine(terrain), source, dest);
    }
}

fn draw_cloud(
    cloud: &Cloud,
    config: &CloudConfig,
    view_width: i32,
    sheet: &SpriteSheet,
    sink: &mut impl SpriteSink,
) {
    if cloud.remove || cloud.x_pos >= view_width {
        return;
    }
    let s = sheet.scale;
    let source = Rect::new(sheet.cloud.x, sheet.cloud.y, cloud.width * s, config.height * s);
    let dest = Rect::new(cloud.x_pos, cloud.y_pos, cloud.width, config.height);
    sink.draw_sprite(SpriteId::Cloud, source, dest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::ObstacleType;
    use crate::tuning::Tuning;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(String, Rect, Rect)>,
    }

    impl SpriteSink for Recorder {
        fn draw_sprite(&mut self, sprite: SpriteId<'_>, source: Rect, dest: Rect) {
            self.calls.push((format!("{sprite:?}"), source, dest));
        }
    }

    fn bird(size: u32, frame: u32) -> Obstacle {
        let kind = Arc::new(ObstacleType::default_catalog().remove(2));
        let mut obstacle = Obstacle::new(kind, 2, size, 300, 75);
        obstacle.current_frame = frame;
        obstacle
    }

    #[test]
    fn test_obstacle_group_source_rect() {
        let kind = Arc::new(ObstacleType::default_catalog().remove(1));
        let obstacle = Obstacle::new(kind, 1, 3, 300, 90);
        let mut sink = Recorder::default();
        draw_obstacle(&obstacle, &SpriteSheet::ldpi(), &mut sink);
        let (_, source, dest) = &sink.calls[0];
        // 25 * 3 * 1 + 332
        assert_eq!(*source, Rect::new(407, 2, 75, 50));
        assert_eq!(*dest, Rect::new(300, 90, 75, 50));
    }

    #[test]
    fn test_animated_obstacle_frame_offset() {
        let mut sink = Recorder::default();
        draw_obstacle(&bird(1, 1), &SpriteSheet::ldpi(), &mut sink);
        assert_eq!(sink.calls[0].1, Rect::new(134 + 46, 2, 46, 40));
    }

    #[test]
    fn test_hdpi_doubles_source() {
        let mut sink = Recorder::default();
        draw_obstacle(&bird(1, 0), &SpriteSheet::hdpi(), &mut sink);
        assert_eq!(sink.calls[0].1, Rect::new(260, 2, 92, 80));
        assert_eq!(sink.calls[0].2, Rect::new(300, 75, 46, 40));
    }

    #[test]
    fn test_unknown_obstacle_skipped() {
        let mut kind = ObstacleType::default_catalog().remove(0);
        kind.name = "ROCK".to_string();
        let obstacle = Obstacle::new(Arc::new(kind), 0, 1, 100, 100);
        let mut sink = Recorder::default();
        draw_obstacle(&obstacle, &SpriteSheet::ldpi(), &mut sink);
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn test_draw_frame_covers_scene() {
        let mut state = GameState::new(Tuning::default(), 3).unwrap();
        state.start();
        state.finish_intro();
        let kind = Arc::clone(&state.horizon.generator.catalog()[0]);
        state.horizon.generator.push(Obstacle::new(kind, 0, 1, 400, 105));

        let mut sink = Recorder::default();
        draw_frame(&state, &SpriteSheet::ldpi(), &mut sink);

        let count = |prefix: &str| sink.calls.iter().filter(|c| c.0.starts_with(prefix)).count();
        assert_eq!(count("HorizonLine"), 2);
        assert_eq!(count("Obstacle"), 1);
        assert_eq!(count("Character"), 1);
        let on_screen = state.horizon.clouds.iter().filter(|c| c.x_pos < 600).count();
        assert_eq!(count("Cloud"), on_screen);

        let (_, source, dest) = sink.calls.last().unwrap();
        assert_eq!(*source, Rect::new(848 + 88, 2, 44, 47));
        assert_eq!(*dest, Rect::new(50, 93, 44, 47));
    }

    #[test]
    fn test_ducking_character_is_wider() {
        let mut state = GameState::new(Tuning::default(), 3).unwrap();
        state.start();
        state.finish_intro();
        state.character.set_duck(true, &mut state.rng);
        let mut sink = Recorder::default();
        draw_character(&state.character, &SpriteSheet::ldpi(), &mut sink);
        assert_eq!(sink.calls[0].1, Rect::new(848 + 264, 2, 59, 47));
    }
}
