//! Axis-aligned box geometry
//!
//! Boxes are stored in entity-local coordinates and translated into world
//! space by adding the owning entity's position.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollisionBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl CollisionBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// New box offset by `(dx, dy)`
    #[inline]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// New box offset by another box's origin
    #[inline]
    pub fn offset_by(&self, origin: &CollisionBox) -> Self {
        self.translated(origin.x, origin.y)
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Strict AABB overlap; touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &CollisionBox) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_boxes() {
        let a = CollisionBox::new(0, 0, 10, 10);
        let b = CollisionBox::new(5, 5, 10, 10);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_separate_boxes() {
        let a = CollisionBox::new(0, 0, 10, 10);
        let b = CollisionBox::new(20, 20, 10, 10);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = CollisionBox::new(0, 0, 10, 10);
        let right = CollisionBox::new(10, 0, 10, 10);
        let below = CollisionBox::new(0, 10, 10, 10);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
    }

    #[test]
    fn test_translate_does_not_mutate() {
        let local = CollisionBox::new(2, 3, 4, 5);
        let world = local.offset_by(&CollisionBox::new(100, 50, 44, 47));
        assert_eq!(world, CollisionBox::new(102, 53, 4, 5));
        assert_eq!(local, CollisionBox::new(2, 3, 4, 5));
    }
}
