//! Game state and session-level simulation types
//!
//! Everything a run needs lives in `GameState`; restart resets it in place.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::character::{Character, CharacterStatus};
use super::collision::Collision;
use super::horizon::Horizon;
use crate::error::{ConfigError, TransitionError};
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Idle before the first jump
    Waiting,
    /// Character walking in; the scene does not scroll
    Intro,
    /// Active gameplay
    Playing,
    /// Scheduling suspended, state preserved
    Paused,
    /// Run ended on a collision
    Crashed,
}

/// Notable things that happened during a frame, for sound or UI hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jump,
    Crash { distance: f64 },
    /// Displayed distance reached a multiple of the achievement distance
    Achievement { distance: u32 },
    /// Night mode switched on (true) or off (false)
    NightMode(bool),
    NewHighScore { distance: u32 },
}

/// Night mode timer, triggered by displayed distance milestones
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NightCycle {
    pub inverted: bool,
    pub timer: f64,
    /// Last distance milestone (in units of the invert distance) that fired
    pub last_trigger: u32,
}

impl NightCycle {
    /// Advance the cycle, returning the new mode when it changes
    pub fn update(
        &mut self,
        dt_ms: f64,
        actual_distance: u32,
        invert_distance: u32,
        fade_duration_ms: f64,
    ) -> Option<bool> {
        if self.inverted {
            self.timer += dt_ms;
            if self.timer > fade_duration_ms {
                self.inverted = false;
                self.timer = 0.0;
                return Some(false);
            }
            return None;
        }

        if invert_distance == 0 || actual_distance == 0 {
            return None;
        }
        let milestone = actual_distance / invert_distance;
        if milestone > self.last_trigger {
            self.last_trigger = milestone;
            self.inverted = true;
            self.timer = 0.0;
            return Some(true);
        }
        None
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Phase to return to when unpaused
    pub resume_phase: Option<GamePhase>,
    /// Time spent playing since the run (re)started
    pub running_time: f64,
    /// Pixels travelled this run
    pub distance: f64,
    pub speed: f64,
    pub horizon: Horizon,
    pub character: Character,
    pub night: NightCycle,
    /// Achievement milestones passed this run
    pub achievements: u32,
    /// Events raised since the last frame report
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh waiting session. The tuning is validated here.
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, ConfigError> {
        tuning.validate()?;

        let mut rng = Pcg32::seed_from_u64(seed);
        let horizon = Horizon::new(
            tuning.horizon_line,
            tuning.clouds,
            &tuning.obstacles,
            tuning.generation_rules(),
            &mut rng,
        );
        let character = Character::new(tuning.character.clone(), tuning.ground_y(), &mut rng);

        Ok(Self {
            speed: tuning.speed,
            tuning,
            rng,
            phase: GamePhase::Waiting,
            resume_phase: None,
            running_time: 0.0,
            distance: 0.0,
            horizon,
            character,
            night: NightCycle::default(),
            achievements: 0,
            events: Vec::new(),
        })
    }

    /// Intro or playing: frames should keep being scheduled
    pub fn is_running(&self) -> bool {
        matches!(self.phase, GamePhase::Intro | GamePhase::Playing)
    }

    /// Begin the intro walk-in. Returns false if already started.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Waiting {
            return false;
        }
        self.phase = GamePhase::Intro;
        self.character.begin_intro();
        self.character.set_status(CharacterStatus::Running, &mut self.rng);
        log::info!("Session started");
        true
    }

    /// Intro walk-in finished; the clear-time grace period starts now
    pub fn finish_intro(&mut self) {
        self.character.finish_intro();
        self.running_time = 0.0;
        self.phase = GamePhase::Playing;
        log::info!("Intro complete");
    }

    pub fn crash(&mut self, collision: &Collision) {
        self.character.crash(&mut self.rng);
        self.phase = GamePhase::Crashed;
        self.resume_phase = None;
        self.events.push(GameEvent::Crash {
            distance: self.distance,
        });
        log::info!(
            "Crashed at distance {} (speed {:.3}) into {:?}",
            self.actual_distance(),
            self.speed,
            collision.obstacle_box
        );
    }

    /// Reset the run in place and resume in `Playing`
    pub fn reset(&mut self) {
        self.running_time = 0.0;
        self.distance = 0.0;
        self.speed = self.tuning.speed;
        self.horizon.reset();
        self.character.reset(&mut self.rng);
        self.night.reset();
        self.achievements = 0;
        self.events.clear();
        self.resume_phase = None;
        self.phase = GamePhase::Playing;
    }

    pub fn pause(&mut self) -> Result<(), TransitionError> {
        match self.phase {
            GamePhase::Intro | GamePhase::Playing => {
                self.resume_phase = Some(self.phase);
                self.phase = GamePhase::Paused;
                log::debug!("Paused");
                Ok(())
            }
            GamePhase::Paused => Ok(()),
            GamePhase::Waiting => Err(TransitionError::NotStarted),
            GamePhase::Crashed => Err(TransitionError::Crashed),
        }
    }

    pub fn resume(&mut self) -> Result<(), TransitionError> {
        match self.phase {
            GamePhase::Paused => {
                self.phase = self.resume_phase.take().unwrap_or(GamePhase::Playing);
                log::debug!("Resumed");
                Ok(())
            }
            GamePhase::Intro | GamePhase::Playing => Ok(()),
            GamePhase::Waiting => Err(TransitionError::NotStarted),
            GamePhase::Crashed => Err(TransitionError::Crashed),
        }
    }

    /// Distance as shown on the meter, capped to its digit count
    pub fn actual_distance(&self) -> u32 {
        if self.distance <= 0.0 {
            return 0;
        }
        let units = (self.distance.ceil() * self.tuning.distance.coefficient).round();
        (units as u32).min(self.tuning.distance.max_distance())
    }

    /// Score recorded for the best-distance store
    pub fn score(&self) -> u32 {
        self.distance.max(0.0).ceil() as u32
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> GameState {
        GameState::new(Tuning::default(), 42).unwrap()
    }

    #[test]
    fn test_new_state_waits() {
        let state = state();
        assert_eq!(state.phase, GamePhase::Waiting);
        assert_eq!(state.speed, 6.0);
        assert_eq!(state.character.status, CharacterStatus::Waiting);
        assert_eq!(state.horizon.obstacles().count(), 0);
        assert!(!state.is_running());
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let mut tuning = Tuning::default();
        tuning.obstacles.clear();
        assert!(matches!(
            GameState::new(tuning, 1),
            Err(ConfigError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_start_enters_intro_once() {
        let mut state = state();
        assert!(state.start());
        assert_eq!(state.phase, GamePhase::Intro);
        assert_eq!(state.character.x_pos, 0);
        assert!(!state.start());
    }

    #[test]
    fn test_pause_and_resume() {
        let mut state = state();
        assert_eq!(state.pause(), Err(TransitionError::NotStarted));
        state.start();
        state.finish_intro();
        state.pause().unwrap();
        assert_eq!(state.phase, GamePhase::Paused);
        state.resume().unwrap();
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_resume_after_crash_rejected() {
        let mut state = state();
        state.start();
        state.finish_intro();
        let collision = Collision {
            character_box: Default::default(),
            obstacle_box: Default::default(),
        };
        state.crash(&collision);
        assert_eq!(state.resume(), Err(TransitionError::Crashed));
        assert_eq!(state.pause(), Err(TransitionError::Crashed));
        assert_eq!(state.phase, GamePhase::Crashed);
        let events = state.take_events();
        assert!(matches!(events.as_slice(), [GameEvent::Crash { .. }]));
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut state = state();
        state.start();
        state.finish_intro();
        state.distance = 1234.5;
        state.speed = 9.0;
        state.night.inverted = true;
        state.reset();
        assert_eq!(state.distance, 0.0);
        assert_eq!(state.speed, 6.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.night.inverted);
        assert_eq!(state.character.status, CharacterStatus::Running);
    }

    #[test]
    fn test_actual_distance_conversion() {
        let mut state = state();
        assert_eq!(state.actual_distance(), 0);
        state.distance = 4000.0;
        assert_eq!(state.actual_distance(), 100);
        state.distance = 1.0e9;
        assert_eq!(state.actual_distance(), 99999);
        state.distance = 10.2;
        assert_eq!(state.score(), 11);
    }

    #[test]
    fn test_night_cycle() {
        let mut night = NightCycle::default();
        assert_eq!(night.update(16.0, 699, 700, 12000.0), None);
        assert_eq!(night.update(16.0, 700, 700, 12000.0), Some(true));
        assert_eq!(night.update(16.0, 701, 700, 12000.0), None);
        assert_eq!(night.update(12000.0, 900, 700, 12000.0), Some(false));
        // Same milestone does not retrigger
        assert_eq!(night.update(16.0, 1000, 700, 12000.0), None);
        assert_eq!(night.update(16.0, 1400, 700, 12000.0), Some(true));
    }
}
