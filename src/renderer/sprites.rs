//! Sprite sheet atlas positions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Top-left corner of an element in the sprite sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpritePos {
    pub x: i32,
    pub y: i32,
}

const fn pos(x: i32, y: i32) -> SpritePos {
    SpritePos { x, y }
}

/// Atlas layout for one pixel density
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteSheet {
    /// Source pixels per destination pixel
    pub scale: i32,
    pub character: SpritePos,
    pub cloud: SpritePos,
    pub horizon: SpritePos,
    /// Keyed by obstacle type name
    pub obstacles: HashMap<String, SpritePos>,
}

impl SpriteSheet {
    /// Standard density sheet
    pub fn ldpi() -> Self {
        Self {
            scale: 1,
            character: pos(848, 2),
            cloud: pos(86, 2),
            horizon: pos(2, 54),
            obstacles: HashMap::from([
                ("CACTUS_SMALL".to_string(), pos(228, 2)),
                ("CACTUS_LARGE".to_string(), pos(332, 2)),
                ("PTERODACTYL".to_string(), pos(134, 2)),
            ]),
        }
    }

    /// Double density sheet
    pub fn hdpi() -> Self {
        Self {
            scale: 2,
            character: pos(1678, 2),
            cloud: pos(166, 2),
            horizon: pos(2, 104),
            obstacles: HashMap::from([
                ("CACTUS_SMALL".to_string(), pos(446, 2)),
                ("CACTUS_LARGE".to_string(), pos(652, 2)),
                ("PTERODACTYL".to_string(), pos(260, 2)),
            ]),
        }
    }

    pub fn obstacle(&self, name: &str) -> Option<SpritePos> {
        self.obstacles.get(name).copied()
    }
}

impl Default for SpriteSheet {
    fn default() -> Self {
        Self::ldpi()
    }
}
