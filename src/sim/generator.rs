//! Procedural obstacle generation
//!
//! Owns the active obstacle list. Obstacles are appended on the right and
//! retired from the front, so the list is always ordered by x position.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::Rng;

use super::obstacle::{Obstacle, ObstacleType, SpawnContext};
use crate::error::GenerationError;

/// Random type rolls before falling back to a deterministic scan
pub const MAX_SELECTION_ATTEMPTS: u32 = 32;

/// Spacing and grouping rules resolved from tuning
#[derive(Debug, Clone, Copy)]
pub struct GenerationRules {
    pub gap_coefficient: f64,
    pub max_gap_coefficient: f64,
    pub max_group_size: u32,
    /// How many identical types may spawn back to back
    pub max_duplication: usize,
    pub view_width: i32,
}

#[derive(Debug, Clone)]
pub struct ObstacleGenerator {
    catalog: Vec<Arc<ObstacleType>>,
    rules: GenerationRules,
    obstacles: VecDeque<Obstacle>,
    /// Catalog indices of recent spawns, newest first
    history: VecDeque<usize>,
}

impl ObstacleGenerator {
    pub fn new(catalog: &[ObstacleType], rules: GenerationRules) -> Self {
        Self {
            catalog: catalog.iter().cloned().map(Arc::new).collect(),
            rules,
            obstacles: VecDeque::new(),
            history: VecDeque::with_capacity(rules.max_duplication + 1),
        }
    }

    pub fn obstacles(&self) -> &VecDeque<Obstacle> {
        &self.obstacles
    }

    /// The obstacle nearest the character
    pub fn leading(&self) -> Option<&Obstacle> {
        self.obstacles.front()
    }

    pub fn catalog(&self) -> &[Arc<ObstacleType>] {
        &self.catalog
    }

    pub fn history(&self) -> impl Iterator<Item = usize> + '_ {
        self.history.iter().copied()
    }

    /// Append an already-built obstacle (scripted scenarios, tests)
    pub fn push(&mut self, obstacle: Obstacle) {
        self.obstacles.push_back(obstacle);
    }

    /// Would spawning `index` extend a run past the duplication limit?
    pub fn is_duplicate(&self, index: usize) -> bool {
        let limit = self.rules.max_duplication;
        self.history.len() >= limit && self.history.iter().take(limit).all(|&i| i == index)
    }

    #[inline]
    fn is_fast_enough(&self, index: usize, speed: f64) -> bool {
        speed >= self.catalog[index].min_speed
    }

    /// Pick a catalog index for the next spawn.
    ///
    /// Rolls uniformly a bounded number of times, then scans for any
    /// acceptable type, then falls back to the least recently used type
    /// that is fast enough. Fails only if no type meets the speed minimum.
    pub fn select_type<R: Rng + ?Sized>(
        &self,
        speed: f64,
        rng: &mut R,
    ) -> Result<usize, GenerationError> {
        let count = self.catalog.len();
        let acceptable = |i: usize| self.is_fast_enough(i, speed) && !self.is_duplicate(i);

        if count > 0 {
            for _ in 0..MAX_SELECTION_ATTEMPTS {
                let index = rng.random_range(0..count);
                if acceptable(index) {
                    return Ok(index);
                }
            }
        }

        if let Some(index) = (0..count).find(|&i| acceptable(i)) {
            return Ok(index);
        }

        let fallback = (0..count)
            .filter(|&i| self.is_fast_enough(i, speed))
            .max_by_key(|i| {
                self.history
                    .iter()
                    .position(|h| h == i)
                    .unwrap_or(usize::MAX)
            });

        match fallback {
            Some(index) => {
                log::warn!(
                    "Obstacle duplication limit unsatisfiable at speed {speed:.2}, reusing {}",
                    self.catalog[index].name
                );
                Ok(index)
            }
            None => Err(GenerationError::Exhausted {
                attempts: MAX_SELECTION_ATTEMPTS,
                speed,
            }),
        }
    }

    /// Spawn one obstacle group at the right edge
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        speed: f64,
        rng: &mut R,
    ) -> Result<&Obstacle, GenerationError> {
        let index = self.select_type(speed, rng)?;
        let ctx = SpawnContext {
            speed,
            gap_coefficient: self.rules.gap_coefficient,
            max_gap_coefficient: self.rules.max_gap_coefficient,
            max_group_size: self.rules.max_group_size,
            view_width: self.rules.view_width,
        };
        let obstacle = Obstacle::spawn(Arc::clone(&self.catalog[index]), index, &ctx, rng);
        log::debug!(
            "Spawned {} x{} gap={}",
            obstacle.kind.name,
            obstacle.size,
            obstacle.gap
        );

        self.history.push_front(index);
        self.history.truncate(self.rules.max_duplication);
        self.obstacles.push_back(obstacle);

        Ok(&self.obstacles[self.obstacles.len() - 1])
    }

    /// Advance every obstacle, retire those past the left edge, and spawn
    /// a successor once the newest obstacle has opened up its gap.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f64,
        speed: f64,
        rng: &mut R,
    ) -> Result<(), GenerationError> {
        for obstacle in self.obstacles.iter_mut() {
            obstacle.update(dt_ms, speed);
        }

        while self.obstacles.front().is_some_and(|o| o.remove) {
            self.obstacles.pop_front();
        }

        let view_width = self.rules.view_width;
        let needs_successor = match self.obstacles.back() {
            Some(last) => {
                !last.following_obstacle_created
                    && last.is_visible()
                    && last.x_pos + last.width + last.gap < view_width
            }
            None => true,
        };

        if needs_successor {
            let had_predecessor = !self.obstacles.is_empty();
            self.spawn(speed, rng)?;
            if had_predecessor {
                let len = self.obstacles.len();
                self.obstacles[len - 2].following_obstacle_created = true;
            }
        }

        Ok(())
    }

    /// Drop all obstacles and spawn history
    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.history.clear();
    }
}
