//! Scrolling background: ground line, clouds, and the obstacle field

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::generator::{GenerationRules, ObstacleGenerator};
use super::obstacle::{Obstacle, ObstacleType};
use crate::error::GenerationError;
use crate::scroll_increment;

/// Ground line dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonLineConfig {
    pub width: i32,
    pub height: i32,
    pub y_pos: i32,
    /// Probability a recycled tile stays flat
    pub bump_threshold: f64,
}

/// Cloud layer parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudConfig {
    pub width: i32,
    pub height: i32,
    pub min_gap: i32,
    pub max_gap: i32,
    /// Highest point a cloud may sit at (smallest y)
    pub max_sky_level: i32,
    /// Lowest point a cloud may sit at (largest y)
    pub min_sky_level: i32,
    /// Fraction of game speed clouds scroll at
    pub speed: f64,
    /// Chance per frame of adding a cloud once the gap allows it
    pub frequency: f64,
    pub max_clouds: usize,
}

/// Ground tile terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Flat,
    Bumpy,
}

/// Two contiguous tiles that scroll and wrap to form an endless ground
#[derive(Debug, Clone)]
pub struct HorizonLine {
    pub config: HorizonLineConfig,
    pub x_pos: [i32; 2],
    pub terrain: [Terrain; 2],
}

impl HorizonLine {
    pub fn new(config: HorizonLineConfig) -> Self {
        Self {
            config,
            x_pos: [0, config.width],
            terrain: [Terrain::Flat, Terrain::Bumpy],
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt_ms: f64, speed: f64, rng: &mut R) {
        let increment = scroll_increment(speed, dt_ms);
        if self.x_pos[0] <= 0 {
            self.scroll_tile(0, increment, rng);
        } else {
            self.scroll_tile(1, increment, rng);
        }
    }

    fn scroll_tile<R: Rng + ?Sized>(&mut self, lead: usize, increment: i32, rng: &mut R) {
        let follow = 1 - lead;
        let width = self.config.width;

        self.x_pos[lead] = self.x_pos[lead].saturating_sub(increment);
        self.x_pos[follow] = self.x_pos[lead].saturating_add(width);

        if self.x_pos[lead] <= -width {
            // Wrap back into (-width, width] however far the frame scrolled
            let behind = (width as i64 - self.x_pos[lead] as i64).rem_euclid(2 * width as i64);
            self.x_pos[lead] = width - behind as i32;
            self.x_pos[follow] = if self.x_pos[lead] > 0 {
                self.x_pos[lead] - width
            } else {
                self.x_pos[lead] + width
            };
            self.terrain[lead] = self.random_terrain(rng);
        }
    }

    fn random_terrain<R: Rng + ?Sized>(&self, rng: &mut R) -> Terrain {
        if rng.random::<f64>() > self.config.bump_threshold {
            Terrain::Bumpy
        } else {
            Terrain::Flat
        }
    }

    /// Tiles always abut: one starts exactly where the other ends
    pub fn is_contiguous(&self) -> bool {
        (self.x_pos[1] - self.x_pos[0]).abs() == self.config.width
    }

    pub fn reset(&mut self) {
        self.x_pos = [0, self.config.width];
    }
}

/// A decorative cloud
#[derive(Debug, Clone)]
pub struct Cloud {
    pub x_pos: i32,
    pub y_pos: i32,
    pub width: i32,
    /// Space required behind this cloud before another may spawn
    pub gap: i32,
    pub remove: bool,
}

impl Cloud {
    pub fn spawn<R: Rng + ?Sized>(config: &CloudConfig, view_width: i32, rng: &mut R) -> Self {
        let (top, bottom) = (
            config.max_sky_level.min(config.min_sky_level),
            config.max_sky_level.max(config.min_sky_level),
        );
        Self {
            x_pos: view_width,
            y_pos: rng.random_range(top..=bottom),
            width: config.width,
            gap: rng.random_range(config.min_gap..=config.max_gap.max(config.min_gap)),
            remove: false,
        }
    }

    pub fn update(&mut self, increment: i32) {
        if !self.remove {
            self.x_pos = self.x_pos.saturating_sub(increment);
        }
        if self.x_pos.saturating_add(self.width) <= 0 {
            self.remove = true;
        }
    }
}

/// Background scroller: owns the ground, clouds and obstacle generator
#[derive(Debug, Clone)]
pub struct Horizon {
    pub line: HorizonLine,
    pub clouds: Vec<Cloud>,
    pub cloud_config: CloudConfig,
    pub generator: ObstacleGenerator,
    view_width: i32,
}

impl Horizon {
    pub fn new<R: Rng + ?Sized>(
        line: HorizonLineConfig,
        cloud_config: CloudConfig,
        catalog: &[ObstacleType],
        rules: GenerationRules,
        rng: &mut R,
    ) -> Self {
        let mut horizon = Self {
            line: HorizonLine::new(line),
            clouds: Vec::with_capacity(cloud_config.max_clouds),
            cloud_config,
            generator: ObstacleGenerator::new(catalog, rules),
            view_width: rules.view_width,
        };
        horizon.add_cloud(rng);
        horizon
    }

    /// Advance every layer. Obstacles only move once `has_obstacles` is set.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f64,
        speed: f64,
        has_obstacles: bool,
        rng: &mut R,
    ) -> Result<(), GenerationError> {
        self.line.update(dt_ms, speed, rng);
        self.update_clouds(dt_ms, speed, rng);
        if has_obstacles {
            self.generator.update(dt_ms, speed, rng)?;
        }
        Ok(())
    }

    fn add_cloud<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.clouds
            .push(Cloud::spawn(&self.cloud_config, self.view_width, rng));
    }

    fn update_clouds<R: Rng + ?Sized>(&mut self, dt_ms: f64, speed: f64, rng: &mut R) {
        let increment = (dt_ms * self.cloud_config.speed * speed / 1000.0).ceil() as i32;

        if self.clouds.is_empty() {
            self.add_cloud(rng);
            return;
        }

        for cloud in self.clouds.iter_mut() {
            cloud.update(increment);
        }

        let room_for_another = self.clouds.last().is_some_and(|last| {
            self.clouds.len() < self.cloud_config.max_clouds
                && self.view_width - last.x_pos > last.gap
        });
        if room_for_another && self.cloud_config.frequency > rng.random::<f64>() {
            self.add_cloud(rng);
        }

        self.clouds.retain(|c| !c.remove);
    }

    /// Obstacle nearest the character
    pub fn leading_obstacle(&self) -> Option<&Obstacle> {
        self.generator.leading()
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.generator.obstacles().iter()
    }

    pub fn reset(&mut self) {
        self.generator.reset();
        self.line.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn line_config() -> HorizonLineConfig {
        HorizonLineConfig {
            width: 600,
            height: 12,
            y_pos: 127,
            bump_threshold: 0.5,
        }
    }

    fn cloud_config() -> CloudConfig {
        CloudConfig {
            width: 46,
            height: 14,
            min_gap: 100,
            max_gap: 400,
            max_sky_level: 30,
            min_sky_level: 71,
            speed: 0.2,
            frequency: 0.5,
            max_clouds: 6,
        }
    }

    fn horizon(rng: &mut Pcg32) -> Horizon {
        let rules = GenerationRules {
            gap_coefficient: 0.6,
            max_gap_coefficient: 1.5,
            max_group_size: 3,
            max_duplication: 2,
            view_width: 600,
        };
        Horizon::new(
            line_config(),
            cloud_config(),
            &ObstacleType::default_catalog(),
            rules,
            rng,
        )
    }

    #[test]
    fn test_line_wraps() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut line = HorizonLine::new(line_config());
        // 5px per frame, 120 frames push tile 0 fully off screen
        for _ in 0..119 {
            line.update(16.0, 6.0, &mut rng);
        }
        assert_eq!(line.x_pos, [-595, 5]);
        line.update(16.0, 6.0, &mut rng);
        assert_eq!(line.x_pos, [600, 0]);
        assert!(line.is_contiguous());
    }

    #[test]
    fn test_line_wraps_after_long_scroll() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut line = HorizonLine::new(line_config());
        for dt in [5000.0, 1.0e10, f64::INFINITY] {
            line.update(dt, 6.0, &mut rng);
            assert!(line.is_contiguous());
            for x in line.x_pos {
                assert!(x > -600 && x <= 600, "tile off screen at {x}");
            }
            assert!(line.x_pos.iter().any(|&x| x <= 0));
        }
    }

    #[test]
    fn test_clouds_spawn_within_sky_band() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut horizon = horizon(&mut rng);
        for _ in 0..5000 {
            horizon.update(16.0, 6.0, false, &mut rng).unwrap();
            assert!(horizon.clouds.len() <= 6);
            for cloud in &horizon.clouds {
                assert!((30..=71).contains(&cloud.y_pos));
            }
        }
        assert!(!horizon.clouds.is_empty());
    }

    #[test]
    fn test_obstacles_suppressed_until_enabled() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut horizon = horizon(&mut rng);
        for _ in 0..100 {
            horizon.update(16.0, 6.0, false, &mut rng).unwrap();
        }
        assert_eq!(horizon.obstacles().count(), 0);

        horizon.update(16.0, 6.0, true, &mut rng).unwrap();
        assert_eq!(horizon.obstacles().count(), 1);
    }

    #[test]
    fn test_reset() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut horizon = horizon(&mut rng);
        for _ in 0..50 {
            horizon.update(16.0, 6.0, true, &mut rng).unwrap();
        }
        horizon.reset();
        assert_eq!(horizon.obstacles().count(), 0);
        assert_eq!(horizon.line.x_pos, [0, 600]);
    }

    proptest! {
        #[test]
        fn prop_tiles_stay_contiguous(
            seed in any::<u64>(),
            frames in proptest::collection::vec((0.0f64..50.0, 6.0f64..13.0), 1..400),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut line = HorizonLine::new(line_config());
            for (dt, speed) in frames {
                line.update(dt, speed, &mut rng);
                prop_assert!(line.is_contiguous(), "tiles split: {:?}", line.x_pos);
                prop_assert!(line.x_pos.iter().all(|&x| x > -600 && x <= 1200));
            }
        }
    }
}
