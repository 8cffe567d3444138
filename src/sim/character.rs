//! The player character: jump physics, ducking, and animation state

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::CollisionBox;
use crate::error::TransitionError;

/// Character animation/physics status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterStatus {
    /// Idle before the run starts (blinks occasionally)
    Waiting,
    Running,
    Jumping,
    Ducking,
    /// Terminal until reset
    Crashed,
}

/// Frame count and pacing of one status' animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrames {
    pub frame_count: u32,
    pub ms_per_frame: f64,
}

impl CharacterStatus {
    pub fn animation(&self) -> AnimationFrames {
        let (frame_count, fps) = match self {
            CharacterStatus::Waiting => (2, 3.0),
            CharacterStatus::Running => (2, 12.0),
            CharacterStatus::Crashed => (1, 60.0),
            CharacterStatus::Jumping => (1, 60.0),
            CharacterStatus::Ducking => (2, 8.0),
        };
        AnimationFrames {
            frame_count,
            ms_per_frame: 1000.0 / fps,
        }
    }
}

/// Character dimensions and jump tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterConfig {
    pub width: i32,
    pub height: i32,
    pub width_duck: i32,
    pub height_duck: i32,
    pub gravity: f64,
    /// Rise above ground required before a jump may be cut short
    pub min_jump_height: i32,
    /// Y position past which the jump is cut to the drop velocity;
    /// the character never rises above `-max_jump_height`
    pub max_jump_height: i32,
    /// Negative is up
    pub initial_jump_velocity: f64,
    /// Share of game speed subtracted from the jump impulse
    pub jump_speed_fraction: f64,
    pub drop_velocity: f64,
    pub speed_drop_coefficient: f64,
    pub start_x_pos: i32,
    pub intro_duration_ms: f64,
    pub blink_timing_ms: f64,
    pub running_boxes: Vec<CollisionBox>,
    pub ducking_boxes: Vec<CollisionBox>,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            width: 44,
            height: 47,
            width_duck: 59,
            height_duck: 25,
            gravity: 0.6,
            min_jump_height: 30,
            max_jump_height: 30,
            initial_jump_velocity: -10.0,
            jump_speed_fraction: 0.1,
            drop_velocity: -5.0,
            speed_drop_coefficient: 3.0,
            start_x_pos: 50,
            intro_duration_ms: 1500.0,
            blink_timing_ms: 7000.0,
            running_boxes: vec![
                CollisionBox::new(22, 0, 17, 16),
                CollisionBox::new(1, 18, 30, 9),
                CollisionBox::new(10, 35, 14, 8),
                CollisionBox::new(1, 24, 29, 5),
                CollisionBox::new(5, 30, 21, 4),
                CollisionBox::new(9, 34, 15, 4),
            ],
            ducking_boxes: vec![CollisionBox::new(1, 18, 55, 25)],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Character {
    pub config: CharacterConfig,
    pub x_pos: i32,
    pub y_pos: i32,
    pub ground_y_pos: i32,
    /// Y the character must rise past before a jump can be cut short
    pub min_jump_y: i32,
    pub jump_velocity: f64,
    pub jumping: bool,
    pub ducking: bool,
    pub reached_min_height: bool,
    pub speed_drop: bool,
    pub status: CharacterStatus,
    pub current_frame: u32,
    pub timer: f64,
    pub blink_delay: f64,
    pub blink_timer: f64,
    pub blink_count: u32,
    pub jump_count: u32,
    pub playing_intro: bool,
    intro_timer: f64,
}

impl Character {
    /// New idle character standing on the ground at x=0
    pub fn new<R: Rng + ?Sized>(config: CharacterConfig, ground_y_pos: i32, rng: &mut R) -> Self {
        let min_jump_y = ground_y_pos - config.min_jump_height;
        let mut character = Self {
            config,
            x_pos: 0,
            y_pos: ground_y_pos,
            ground_y_pos,
            min_jump_y,
            jump_velocity: 0.0,
            jumping: false,
            ducking: false,
            reached_min_height: false,
            speed_drop: false,
            status: CharacterStatus::Waiting,
            current_frame: 0,
            timer: 0.0,
            blink_delay: 0.0,
            blink_timer: 0.0,
            blink_count: 0,
            jump_count: 0,
            playing_intro: false,
            intro_timer: 0.0,
        };
        character.set_status(CharacterStatus::Waiting, rng);
        character
    }

    /// Switch animation, restarting at the first frame
    pub fn set_status<R: Rng + ?Sized>(&mut self, status: CharacterStatus, rng: &mut R) {
        self.status = status;
        self.current_frame = 0;
        self.timer = 0.0;
        if status == CharacterStatus::Waiting {
            self.blink_timer = 0.0;
            self.set_blink_delay(rng);
        }
    }

    fn set_blink_delay<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.blink_delay = (rng.random::<f64>() * self.config.blink_timing_ms).ceil();
    }

    /// Advance animation timers (and the intro walk-in)
    pub fn update(&mut self, dt_ms: f64, rng: &mut impl Rng) {
        self.timer += dt_ms;

        if self.playing_intro && self.x_pos < self.config.start_x_pos {
            self.intro_timer += dt_ms;
            let progress = (self.intro_timer / self.config.intro_duration_ms).min(1.0);
            self.x_pos = (self.config.start_x_pos as f64 * progress).round() as i32;
        }

        if self.status == CharacterStatus::Waiting {
            self.blink_timer += dt_ms;
            if self.is_blinking() && self.current_frame == 1 {
                self.set_blink_delay(rng);
                self.blink_timer = 0.0;
                self.blink_count += 1;
            }
        }

        let anim = self.status.animation();
        if self.timer >= anim.ms_per_frame {
            self.current_frame = (self.current_frame + 1) % anim.frame_count;
            self.timer = 0.0;
        }
    }

    /// Waiting character is past its blink delay and shows animated frames
    pub fn is_blinking(&self) -> bool {
        self.status == CharacterStatus::Waiting && self.blink_timer >= self.blink_delay
    }

    /// Start walking in from the left edge
    pub fn begin_intro(&mut self) {
        self.playing_intro = true;
        self.intro_timer = 0.0;
        self.x_pos = 0;
    }

    pub fn intro_complete(&self) -> bool {
        self.x_pos >= self.config.start_x_pos
    }

    pub fn finish_intro(&mut self) {
        self.playing_intro = false;
        self.x_pos = self.config.start_x_pos;
    }

    /// Jump impulse weakens as the game speeds up
    pub fn start_jump<R: Rng + ?Sized>(
        &mut self,
        speed: f64,
        rng: &mut R,
    ) -> Result<(), TransitionError> {
        match self.status {
            CharacterStatus::Crashed => return Err(TransitionError::Crashed),
            _ if self.jumping => return Err(TransitionError::AlreadyJumping),
            _ if self.ducking => return Err(TransitionError::Ducking),
            _ => {}
        }

        self.set_status(CharacterStatus::Jumping, rng);
        self.jump_velocity =
            self.config.initial_jump_velocity - speed * self.config.jump_speed_fraction;
        self.jumping = true;
        self.reached_min_height = false;
        self.speed_drop = false;
        Ok(())
    }

    /// Cut the jump short once the minimum height has been reached
    pub fn end_jump(&mut self) {
        if self.reached_min_height && self.jump_velocity < self.config.drop_velocity {
            self.jump_velocity = self.config.drop_velocity;
        }
    }

    /// Integrate one frame of jump physics
    pub fn update_jump<R: Rng + ?Sized>(&mut self, dt_ms: f64, rng: &mut R) {
        let frame_ratio = dt_ms / self.status.animation().ms_per_frame;
        let drag = if self.speed_drop {
            self.config.speed_drop_coefficient
        } else {
            1.0
        };

        let step = (self.jump_velocity * drag * frame_ratio).round() as i32;
        self.y_pos = self.y_pos.saturating_add(step);
        self.jump_velocity += self.config.gravity * frame_ratio;

        if self.y_pos < self.min_jump_y || self.speed_drop {
            self.reached_min_height = true;
        }

        if self.y_pos < self.config.max_jump_height || self.speed_drop {
            self.end_jump();
        }

        let ceiling = -self.config.max_jump_height;
        if self.y_pos < ceiling {
            self.y_pos = ceiling;
            self.jump_velocity = self.jump_velocity.max(0.0);
        }

        let descending_onto_ground = self.y_pos == self.ground_y_pos && self.jump_velocity > 0.0;
        if self.y_pos > self.ground_y_pos || descending_onto_ground {
            self.land(rng);
        }
    }

    fn land<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.y_pos = self.ground_y_pos;
        self.jump_velocity = 0.0;
        self.jumping = false;
        self.ducking = false;
        self.speed_drop = false;
        self.set_status(CharacterStatus::Running, rng);
        self.jump_count += 1;
    }

    /// Accelerate the descent of the current jump
    pub fn set_speed_drop(&mut self) {
        self.speed_drop = true;
        self.jump_velocity = 1.0;
    }

    pub fn set_duck<R: Rng + ?Sized>(&mut self, ducking: bool, rng: &mut R) {
        if ducking && self.status != CharacterStatus::Ducking {
            self.set_status(CharacterStatus::Ducking, rng);
            self.ducking = true;
        } else if !ducking && self.status == CharacterStatus::Ducking {
            self.set_status(CharacterStatus::Running, rng);
            self.ducking = false;
        }
    }

    /// Enter the terminal crashed pose; ducking is cancelled
    pub fn crash<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.ducking = false;
        self.speed_drop = false;
        self.set_status(CharacterStatus::Crashed, rng);
    }

    /// Back on the ground, running, at the start position
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.y_pos = self.ground_y_pos;
        self.x_pos = self.config.start_x_pos;
        self.jump_velocity = 0.0;
        self.jumping = false;
        self.ducking = false;
        self.reached_min_height = false;
        self.speed_drop = false;
        self.jump_count = 0;
        self.playing_intro = false;
        self.set_status(CharacterStatus::Running, rng);
    }

    /// Sprite footprint width for the current pose
    pub fn footprint_width(&self) -> i32 {
        if self.ducking && self.status != CharacterStatus::Crashed {
            self.config.width_duck
        } else {
            self.config.width
        }
    }

    /// Outer bounds in world space
    pub fn bounds(&self) -> CollisionBox {
        CollisionBox::new(self.x_pos, self.y_pos, self.footprint_width(), self.config.height)
    }

    /// Local collision boxes for the current pose
    pub fn collision_boxes(&self) -> &[CollisionBox] {
        if self.ducking {
            &self.config.ducking_boxes
        } else {
            &self.config.running_boxes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const GROUND: i32 = 93;

    fn running(rng: &mut Pcg32) -> Character {
        let mut character = Character::new(CharacterConfig::default(), GROUND, rng);
        character.reset(rng);
        character
    }

    fn jump_to_landing(character: &mut Character, rng: &mut Pcg32) -> u32 {
        let mut frames = 0;
        while character.jumping {
            character.update_jump(16.0, rng);
            frames += 1;
            assert!(frames < 500, "jump never landed");
        }
        frames
    }

    #[test]
    fn test_new_character_waits() {
        let mut rng = Pcg32::seed_from_u64(1);
        let character = Character::new(CharacterConfig::default(), GROUND, &mut rng);
        assert_eq!(character.status, CharacterStatus::Waiting);
        assert_eq!(character.y_pos, GROUND);
        assert_eq!(character.min_jump_y, 63);
        assert!(character.blink_delay >= 0.0 && character.blink_delay <= 7000.0);
    }

    #[test]
    fn test_jump_velocity_depends_on_speed() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut character = running(&mut rng);
        character.start_jump(6.0, &mut rng).unwrap();
        assert!((character.jump_velocity - (-10.6)).abs() < 1e-9);
        assert_eq!(character.status, CharacterStatus::Jumping);
    }

    #[test]
    fn test_jump_while_jumping_rejected() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut character = running(&mut rng);
        character.start_jump(6.0, &mut rng).unwrap();
        character.update_jump(16.0, &mut rng);
        let y = character.y_pos;
        let velocity = character.jump_velocity;
        assert_eq!(
            character.start_jump(6.0, &mut rng),
            Err(TransitionError::AlreadyJumping)
        );
        assert_eq!(character.y_pos, y);
        assert_eq!(character.jump_velocity, velocity);
    }

    #[test]
    fn test_full_jump_lands() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut character = running(&mut rng);
        character.start_jump(6.0, &mut rng).unwrap();
        let frames = jump_to_landing(&mut character, &mut rng);
        assert!(frames > 10);
        assert_eq!(character.y_pos, GROUND);
        assert_eq!(character.jump_velocity, 0.0);
        assert_eq!(character.status, CharacterStatus::Running);
        assert_eq!(character.jump_count, 1);
    }

    #[test]
    fn test_early_release_shortens_jump() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut full = running(&mut rng);
        full.start_jump(6.0, &mut rng).unwrap();
        let full_frames = jump_to_landing(&mut full, &mut rng);

        let mut short = running(&mut rng);
        short.start_jump(6.0, &mut rng).unwrap();
        while !short.reached_min_height {
            short.update_jump(16.0, &mut rng);
        }
        short.end_jump();
        assert_eq!(short.jump_velocity, -5.0);
        let short_frames = jump_to_landing(&mut short, &mut rng);
        assert!(short_frames < full_frames);
    }

    #[test]
    fn test_release_before_min_height_ignored() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut character = running(&mut rng);
        character.start_jump(6.0, &mut rng).unwrap();
        character.end_jump();
        assert!((character.jump_velocity - (-10.6)).abs() < 1e-9);
    }

    #[test]
    fn test_speed_drop_lands_sooner() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut normal = running(&mut rng);
        normal.start_jump(6.0, &mut rng).unwrap();
        let normal_frames = jump_to_landing(&mut normal, &mut rng);

        let mut dropped = running(&mut rng);
        dropped.start_jump(6.0, &mut rng).unwrap();
        for _ in 0..5 {
            dropped.update_jump(16.0, &mut rng);
        }
        dropped.set_speed_drop();
        let dropped_frames = jump_to_landing(&mut dropped, &mut rng) + 5;
        assert!(dropped_frames < normal_frames);
        assert!(!dropped.speed_drop);
    }

    #[test]
    fn test_duck_toggles_footprint() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut character = running(&mut rng);
        character.set_duck(true, &mut rng);
        assert_eq!(character.status, CharacterStatus::Ducking);
        assert_eq!(character.footprint_width(), 59);
        assert_eq!(character.collision_boxes().len(), 1);
        assert_eq!(character.start_jump(6.0, &mut rng), Err(TransitionError::Ducking));

        character.set_duck(false, &mut rng);
        assert_eq!(character.status, CharacterStatus::Running);
        assert_eq!(character.footprint_width(), 44);
    }

    #[test]
    fn test_crash_cancels_duck() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut character = running(&mut rng);
        character.set_duck(true, &mut rng);
        character.crash(&mut rng);
        assert!(!character.ducking);
        assert_eq!(character.status, CharacterStatus::Crashed);
        assert_eq!(character.start_jump(6.0, &mut rng), Err(TransitionError::Crashed));
    }

    #[test]
    fn test_running_animation_cycles() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut character = running(&mut rng);
        character.update(50.0, &mut rng);
        assert_eq!(character.current_frame, 0);
        character.update(50.0, &mut rng);
        assert_eq!(character.current_frame, 1);
        character.update(90.0, &mut rng);
        assert_eq!(character.current_frame, 0);
    }

    #[test]
    fn test_waiting_blinks() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut character = Character::new(CharacterConfig::default(), GROUND, &mut rng);
        let mut elapsed = 0.0;
        while character.blink_count == 0 {
            character.update(16.0, &mut rng);
            elapsed += 16.0;
            assert!(elapsed < 20_000.0, "never blinked");
        }
        assert_eq!(character.blink_timer, 0.0);
    }

    #[test]
    fn test_intro_walks_in() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut character = Character::new(CharacterConfig::default(), GROUND, &mut rng);
        character.begin_intro();
        character.update(750.0, &mut rng);
        assert_eq!(character.x_pos, 25);
        assert!(!character.intro_complete());
        character.update(750.0, &mut rng);
        assert!(character.intro_complete());
        character.finish_intro();
        assert_eq!(character.x_pos, 50);
    }

    #[derive(Debug, Clone)]
    enum Action {
        Jump,
        Release,
        Drop,
        Tick(f64),
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            Just(Action::Jump),
            Just(Action::Release),
            Just(Action::Drop),
            (1.0f64..40.0).prop_map(Action::Tick),
        ]
    }

    proptest! {
        #[test]
        fn prop_y_within_bounds(
            speed in 6.0f64..13.0,
            actions in proptest::collection::vec(action(), 1..300),
        ) {
            let mut rng = Pcg32::seed_from_u64(0);
            let mut character = running(&mut rng);
            for action in actions {
                match action {
                    Action::Jump => { let _ = character.start_jump(speed, &mut rng); }
                    Action::Release => character.end_jump(),
                    Action::Drop => if character.jumping { character.set_speed_drop() },
                    Action::Tick(dt) => {
                        if character.jumping {
                            character.update_jump(dt, &mut rng)
                        }
                    }
                }
                prop_assert!(character.y_pos <= GROUND);
                prop_assert!(character.y_pos >= -character.config.max_jump_height);
            }
        }
    }
}
