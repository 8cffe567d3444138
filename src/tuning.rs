//! Game balance tables
//!
//! A `Tuning` is resolved once before a session starts: the base table,
//! then the named preset, then any JSON overrides. Nothing is merged per frame.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::ConfigError;
use crate::sim::character::CharacterConfig;
use crate::sim::generator::GenerationRules;
use crate::sim::horizon::{CloudConfig, HorizonLineConfig};
use crate::sim::obstacle::{MAX_GROUP_SIZE, ObstacleType};

/// Named balance presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    #[default]
    Normal,
    /// Lower speed, floatier jumps, denser obstacles
    Slow,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Normal => "Normal",
            Preset::Slow => "Slow",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" | "default" => Some(Preset::Normal),
            "slow" => Some(Preset::Slow),
            _ => None,
        }
    }
}

/// Distance meter scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceConfig {
    /// Pixels to displayed units
    pub coefficient: f64,
    /// Displayed units between achievement events
    pub achievement_distance: u32,
    /// Digits shown; the displayed distance is capped at `10^max_units - 1`
    pub max_units: u32,
}

impl DistanceConfig {
    pub fn max_distance(&self) -> u32 {
        10u32.saturating_pow(self.max_units).saturating_sub(1)
    }
}

/// Fully resolved balance values for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub preset: Preset,
    pub width: i32,
    pub height: i32,
    /// Starting speed, px per reference frame
    pub speed: f64,
    /// Speed added per frame while playing
    pub acceleration: f64,
    pub max_speed: f64,
    pub gap_coefficient: f64,
    pub max_gap_coefficient: f64,
    /// Grace period before the first obstacle
    pub clear_time_ms: f64,
    pub max_obstacle_duplication: usize,
    pub max_group_size: u32,
    pub bottom_pad: i32,
    /// Delay after a crash before a jump release restarts
    pub gameover_clear_time_ms: f64,
    /// Idle blinks before the waiting screen stops scheduling frames
    pub max_blink_count: u32,
    /// Displayed distance between night mode toggles
    pub invert_distance: u32,
    pub invert_fade_duration_ms: f64,
    pub distance: DistanceConfig,
    pub character: CharacterConfig,
    pub horizon_line: HorizonLineConfig,
    pub clouds: CloudConfig,
    pub obstacles: Vec<ObstacleType>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            preset: Preset::Normal,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            speed: 6.0,
            acceleration: 0.001,
            max_speed: 13.0,
            gap_coefficient: 0.6,
            max_gap_coefficient: 1.5,
            clear_time_ms: 3000.0,
            max_obstacle_duplication: 2,
            max_group_size: 3,
            bottom_pad: 10,
            gameover_clear_time_ms: 1200.0,
            max_blink_count: 3,
            invert_distance: 700,
            invert_fade_duration_ms: 12000.0,
            distance: DistanceConfig {
                coefficient: 0.025,
                achievement_distance: 100,
                max_units: 5,
            },
            character: CharacterConfig::default(),
            horizon_line: HorizonLineConfig {
                width: 600,
                height: 12,
                y_pos: 127,
                bump_threshold: 0.5,
            },
            clouds: CloudConfig {
                width: 46,
                height: 14,
                min_gap: 100,
                max_gap: 400,
                max_sky_level: 30,
                min_sky_level: 71,
                speed: 0.2,
                frequency: 0.5,
                max_clouds: 6,
            },
            obstacles: ObstacleType::default_catalog(),
        }
    }
}

/// Optional per-field overrides, usually loaded from JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TuningOverrides {
    pub speed: Option<f64>,
    pub acceleration: Option<f64>,
    pub max_speed: Option<f64>,
    pub gap_coefficient: Option<f64>,
    pub max_gap_coefficient: Option<f64>,
    pub clear_time_ms: Option<f64>,
    pub max_obstacle_duplication: Option<usize>,
    pub max_group_size: Option<u32>,
    pub gameover_clear_time_ms: Option<f64>,
    pub max_blink_count: Option<u32>,
    pub invert_distance: Option<u32>,
    pub invert_fade_duration_ms: Option<f64>,
    pub gravity: Option<f64>,
    pub min_jump_height: Option<i32>,
    pub max_jump_height: Option<i32>,
    pub initial_jump_velocity: Option<f64>,
    pub drop_velocity: Option<f64>,
    pub obstacles: Option<Vec<ObstacleType>>,
}

impl TuningOverrides {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn set<T>(target: &mut T, value: &Option<T>)
where
    T: Clone,
{
    if let Some(v) = value {
        *target = v.clone();
    }
}

impl Tuning {
    /// Base table with a preset applied
    pub fn from_preset(preset: Preset) -> Self {
        let mut tuning = Self::default();
        tuning.apply_preset(preset);
        tuning
    }

    /// Apply a preset's values over the current table
    pub fn apply_preset(&mut self, preset: Preset) {
        self.preset = preset;

        if preset == Preset::Slow {
            self.speed = 4.2;
            self.acceleration = 0.0005;
            self.max_speed = 9.0;
            self.gap_coefficient = 0.3;
            self.invert_distance = 350;
            self.character.gravity = 0.25;
            self.character.min_jump_height = 45;
            self.character.max_jump_height = 50;
            self.character.initial_jump_velocity = -20.0;
        }
    }

    pub fn apply_overrides(&mut self, o: &TuningOverrides) {
        set(&mut self.speed, &o.speed);
        set(&mut self.acceleration, &o.acceleration);
        set(&mut self.max_speed, &o.max_speed);
        set(&mut self.gap_coefficient, &o.gap_coefficient);
        set(&mut self.max_gap_coefficient, &o.max_gap_coefficient);
        set(&mut self.clear_time_ms, &o.clear_time_ms);
        set(&mut self.max_obstacle_duplication, &o.max_obstacle_duplication);
        set(&mut self.max_group_size, &o.max_group_size);
        set(&mut self.gameover_clear_time_ms, &o.gameover_clear_time_ms);
        set(&mut self.max_blink_count, &o.max_blink_count);
        set(&mut self.invert_distance, &o.invert_distance);
        set(&mut self.invert_fade_duration_ms, &o.invert_fade_duration_ms);
        set(&mut self.character.gravity, &o.gravity);
        set(&mut self.character.min_jump_height, &o.min_jump_height);
        set(&mut self.character.max_jump_height, &o.max_jump_height);
        set(&mut self.character.initial_jump_velocity, &o.initial_jump_velocity);
        set(&mut self.character.drop_velocity, &o.drop_velocity);
        set(&mut self.obstacles, &o.obstacles);
    }

    /// Build and validate the table for a session
    pub fn resolve(preset: Preset, overrides: &TuningOverrides) -> Result<Self, ConfigError> {
        let mut tuning = Self::from_preset(preset);
        tuning.apply_overrides(overrides);
        tuning.validate()?;
        log::info!(
            "Resolved {} tuning: speed {} -> {}, {} obstacle types",
            preset.as_str(),
            tuning.speed,
            tuning.max_speed,
            tuning.obstacles.len()
        );
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| ConfigError::InvalidValue {
            field,
            reason: reason.to_string(),
        };

        if self.obstacles.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        for kind in &self.obstacles {
            kind.validate()?;
        }

        if self.width <= 0 || self.height <= 0 {
            return Err(invalid("width", "canvas dimensions must be positive"));
        }
        if self.speed.is_nan() || self.speed <= 0.0 {
            return Err(invalid("speed", "must be positive"));
        }
        if self.max_speed < self.speed {
            return Err(invalid("max_speed", "must not be below the starting speed"));
        }
        if self.acceleration < 0.0 {
            return Err(invalid("acceleration", "must not be negative"));
        }
        if self.gap_coefficient < 0.0 || self.max_gap_coefficient < 1.0 {
            return Err(invalid(
                "max_gap_coefficient",
                "gap coefficients must be non-negative with max >= 1",
            ));
        }
        if self.max_obstacle_duplication == 0 {
            return Err(invalid("max_obstacle_duplication", "must be at least 1"));
        }
        if self.max_group_size == 0 || self.max_group_size > MAX_GROUP_SIZE {
            return Err(invalid("max_group_size", "must be between 1 and 3"));
        }
        if self.clear_time_ms < 0.0 || self.gameover_clear_time_ms < 0.0 {
            return Err(invalid("clear_time_ms", "must not be negative"));
        }
        if self.character.gravity.is_nan() || self.character.gravity <= 0.0 {
            return Err(invalid("gravity", "must be positive"));
        }
        if self.character.initial_jump_velocity >= 0.0 {
            return Err(invalid("initial_jump_velocity", "must be negative (upward)"));
        }
        if self.character.intro_duration_ms <= 0.0 {
            return Err(invalid("intro_duration_ms", "must be positive"));
        }
        if self.ground_y() <= 0 {
            return Err(invalid("height", "character does not fit on the canvas"));
        }
        if self.horizon_line.width <= 0 {
            return Err(invalid("horizon_line.width", "must be positive"));
        }
        if self.clouds.max_gap < self.clouds.min_gap {
            return Err(invalid("clouds.max_gap", "must not be below min_gap"));
        }

        if !self.obstacles.iter().any(|kind| kind.min_speed <= self.speed) {
            return Err(ConfigError::NoReachableObstacle { speed: self.speed });
        }

        Ok(())
    }

    /// Y of the character's top edge when standing
    pub fn ground_y(&self) -> i32 {
        self.height - self.character.height - self.bottom_pad
    }

    pub fn generation_rules(&self) -> GenerationRules {
        GenerationRules {
            gap_coefficient: self.gap_coefficient,
            max_gap_coefficient: self.max_gap_coefficient,
            max_group_size: self.max_group_size,
            max_duplication: self.max_obstacle_duplication,
            view_width: self.width,
        }
    }
}
