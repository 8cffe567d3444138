//! Per-frame simulation pipeline
//!
//! One frame runs, in order: horizon and obstacles, character physics,
//! collision against the leading obstacle, then the crash or
//! distance/speed reaction. Inputs are applied immediately, between frames.

use serde::{Deserialize, Serialize};

use super::collision::{Collision, check_for_collision};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::{MAX_FRAME_MS, MS_PER_FRAME};
use crate::error::TransitionError;

/// Discrete player input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputEvent {
    JumpStart,
    JumpEnd,
    DuckStart,
    DuckEnd,
}

/// Session state after a frame, for the host to read
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub phase: GamePhase,
    pub distance: f64,
    /// Distance as shown on the meter
    pub actual_distance: u32,
    pub speed: f64,
    pub collision: Option<Collision>,
    pub events: Vec<GameEvent>,
}

impl FrameReport {
    fn capture(state: &mut GameState, collision: Option<Collision>) -> Self {
        Self {
            phase: state.phase,
            distance: state.distance,
            actual_distance: state.actual_distance(),
            speed: state.speed,
            collision,
            events: state.take_events(),
        }
    }
}

/// Frame delta limited to `[0, MAX_FRAME_MS]`; NaN counts as zero
pub fn clamp_frame_ms(dt_ms: f64) -> f64 {
    if dt_ms.is_nan() {
        0.0
    } else {
        dt_ms.clamp(0.0, MAX_FRAME_MS)
    }
}

/// Advance the whole simulation by `dt_ms`.
///
/// A zero-length frame moves nothing (no scrolling, physics, distance,
/// speed ramp or animation) but still runs the collision check.
pub fn advance_frame(state: &mut GameState, dt_ms: f64) -> FrameReport {
    let dt_ms = clamp_frame_ms(dt_ms);

    let collision = match state.phase {
        GamePhase::Waiting => {
            if dt_ms > 0.0 {
                state.character.update(dt_ms, &mut state.rng);
            }
            None
        }
        GamePhase::Intro | GamePhase::Playing => run_frame(state, dt_ms),
        GamePhase::Paused | GamePhase::Crashed => None,
    };

    FrameReport::capture(state, collision)
}

fn run_frame(state: &mut GameState, dt_ms: f64) -> Option<Collision> {
    let playing = state.phase == GamePhase::Playing;

    if dt_ms > 0.0 {
        if playing {
            state.running_time += dt_ms;
        }
        let has_obstacles = playing && state.running_time > state.tuning.clear_time_ms;

        // The scene holds still while the character walks in
        let horizon_dt = if playing { dt_ms } else { 0.0 };
        let horizon = &mut state.horizon;
        if let Err(err) = horizon.update(horizon_dt, state.speed, has_obstacles, &mut state.rng) {
            log::warn!("Obstacle generation skipped this frame: {err}");
        }

        if state.character.jumping {
            state.character.update_jump(dt_ms, &mut state.rng);
        }
    }

    let collision = if playing {
        state
            .horizon
            .leading_obstacle()
            .and_then(|obstacle| check_for_collision(obstacle, &state.character))
    } else {
        None
    };

    if let Some(hit) = &collision {
        state.crash(hit);
        return collision;
    }

    if dt_ms > 0.0 {
        if playing {
            state.distance += state.speed * dt_ms / MS_PER_FRAME;
            if state.speed < state.tuning.max_speed {
                state.speed = (state.speed + state.tuning.acceleration).min(state.tuning.max_speed);
            }
            update_meter(state, dt_ms);
        }

        state.character.update(dt_ms, &mut state.rng);

        if state.phase == GamePhase::Intro && state.character.intro_complete() {
            state.finish_intro();
        }
    }

    None
}

/// Achievement milestones and the night cycle
fn update_meter(state: &mut GameState, dt_ms: f64) {
    let actual = state.actual_distance();
    let step = state.tuning.distance.achievement_distance;
    if step > 0 {
        let milestone = actual / step;
        if milestone > state.achievements {
            state.achievements = milestone;
            state.events.push(GameEvent::Achievement { distance: actual });
        }
    }

    let changed = state.night.update(
        dt_ms,
        actual,
        state.tuning.invert_distance,
        state.tuning.invert_fade_duration_ms,
    );
    if let Some(inverted) = changed {
        log::debug!("Night mode {}", if inverted { "on" } else { "off" });
        state.events.push(GameEvent::NightMode(inverted));
    }
}

/// Apply one input to the character immediately.
///
/// Rejected inputs return an error and leave the state untouched.
pub fn apply_input(state: &mut GameState, input: InputEvent) -> Result<(), TransitionError> {
    match state.phase {
        GamePhase::Paused => return Err(TransitionError::Paused),
        GamePhase::Crashed => return Err(TransitionError::Crashed),
        _ => {}
    }

    match input {
        InputEvent::JumpStart => {
            if state.phase == GamePhase::Waiting {
                state.start();
            }
            state.character.start_jump(state.speed, &mut state.rng)?;
            state.events.push(GameEvent::Jump);
        }
        InputEvent::JumpEnd => {
            if state.character.jumping {
                state.character.end_jump();
            }
        }
        InputEvent::DuckStart => {
            if state.phase == GamePhase::Waiting {
                return Err(TransitionError::NotStarted);
            }
            if state.character.jumping {
                state.character.set_speed_drop();
            } else if !state.character.ducking {
                state.character.set_duck(true, &mut state.rng);
            }
        }
        InputEvent::DuckEnd => {
            state.character.speed_drop = false;
            state.character.set_duck(false, &mut state.rng);
        }
    }

    Ok(())
}
