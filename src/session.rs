//! Session: the host-facing game loop
//!
//! Binds the simulation to its collaborators: a clock for frame deltas, a
//! best-score store, and a sprite sink. The host calls `on_frame` for each
//! handle returned by `pending_frame`; stale handles are ignored.

use crate::error::{ConfigError, TransitionError};
use crate::persistence::BestScoreStore;
use crate::platform::Clock;
use crate::renderer::{SpriteSheet, SpriteSink, draw_frame};
use crate::sim::scheduler::{FrameHandle, FrameScheduler};
use crate::sim::state::{GameEvent, GamePhase, GameState};
use crate::sim::tick::{self, FrameReport, InputEvent};
use crate::tuning::Tuning;

pub struct Session<C: Clock, S: BestScoreStore> {
    state: GameState,
    scheduler: FrameScheduler,
    clock: C,
    store: S,
    sheet: SpriteSheet,
    /// Clock reading of the previous frame; `None` makes the next frame zero-length
    last_frame_ms: Option<f64>,
    crashed_at_ms: Option<f64>,
}

impl<C: Clock, S: BestScoreStore> Session<C, S> {
    /// New waiting session with its idle frame already requested
    pub fn new(tuning: Tuning, seed: u64, clock: C, store: S) -> Result<Self, ConfigError> {
        let state = GameState::new(tuning, seed)?;
        let mut session = Self {
            state,
            scheduler: FrameScheduler::new(),
            clock,
            store,
            sheet: SpriteSheet::ldpi(),
            last_frame_ms: None,
            crashed_at_ms: None,
        };
        session.scheduler.schedule();
        log::info!(
            "Session created (seed {seed}), best distance {}",
            session.store.read_best()
        );
        Ok(session)
    }

    pub fn with_sprite_sheet(mut self, sheet: SpriteSheet) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// The frame the host should run next, if any
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.scheduler.pending()
    }

    /// Begin the intro without a jump
    pub fn start(&mut self) {
        if self.state.start() {
            self.activate();
        }
    }

    /// Run one scheduled frame: advance by the clock delta, draw, reschedule
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        sink: &mut impl SpriteSink,
    ) -> Option<FrameReport> {
        if !self.scheduler.fire(handle) {
            log::debug!("Ignoring stale frame {}", handle.id());
            return None;
        }

        let now = self.clock.now_ms();
        let dt_ms = self.last_frame_ms.map_or(0.0, |last| now - last);
        self.last_frame_ms = Some(now);

        let report = self.advance_frame(dt_ms);
        draw_frame(&self.state, &self.sheet, sink);

        if self.wants_frames() {
            self.scheduler.schedule();
        }
        Some(report)
    }

    /// Advance the simulation directly by `dt_ms`, bypassing the scheduler
    pub fn advance_frame(&mut self, dt_ms: f64) -> FrameReport {
        let mut report = tick::advance_frame(&mut self.state, dt_ms);
        if report.collision.is_some() {
            self.handle_crash(&mut report);
        }
        report
    }

    fn wants_frames(&self) -> bool {
        match self.state.phase {
            GamePhase::Intro | GamePhase::Playing => true,
            GamePhase::Waiting => {
                self.state.character.blink_count < self.state.tuning.max_blink_count
            }
            GamePhase::Paused | GamePhase::Crashed => false,
        }
    }

    fn handle_crash(&mut self, report: &mut FrameReport) {
        self.scheduler.cancel();
        self.crashed_at_ms = Some(self.clock.now_ms());

        let score = self.state.score();
        if score > self.store.read_best() {
            match self.store.write_best(score) {
                Ok(()) => {
                    log::info!("New best distance {score}");
                    report.events.push(GameEvent::NewHighScore { distance: score });
                }
                Err(err) => log::warn!("Failed to store best distance {score}: {err}"),
            }
        }
    }

    /// Restart scheduling with a zero-length first frame
    fn activate(&mut self) {
        self.last_frame_ms = None;
        self.scheduler.schedule();
    }

    /// Apply a player input immediately.
    ///
    /// Releasing jump after a crash restarts once the game-over delay has passed.
    pub fn apply_input(&mut self, input: InputEvent) -> Result<(), TransitionError> {
        if self.state.phase == GamePhase::Crashed && input == InputEvent::JumpEnd {
            return self.restart_after_crash();
        }

        let was_waiting = self.state.phase == GamePhase::Waiting;
        tick::apply_input(&mut self.state, input)?;
        if was_waiting && self.state.is_running() {
            self.activate();
        }
        Ok(())
    }

    fn restart_after_crash(&mut self) -> Result<(), TransitionError> {
        let crashed_at = self.crashed_at_ms.unwrap_or(f64::NEG_INFINITY);
        let elapsed = self.clock.now_ms() - crashed_at;
        let required = self.state.tuning.gameover_clear_time_ms;
        if elapsed < required {
            return Err(TransitionError::RestartTooSoon {
                elapsed_ms: elapsed.max(0.0) as u64,
                required_ms: required as u64,
            });
        }
        self.restart()
    }

    /// Reset the run and resume playing. Rejected while a frame is scheduled.
    pub fn restart(&mut self) -> Result<(), TransitionError> {
        if self.scheduler.is_pending() {
            log::warn!("Restart rejected: a frame is still scheduled");
            return Err(TransitionError::FrameInFlight);
        }
        if self.state.phase == GamePhase::Waiting {
            return Err(TransitionError::NotStarted);
        }

        self.state.reset();
        self.crashed_at_ms = None;
        self.activate();
        log::info!("Restarted");
        Ok(())
    }

    /// Stop scheduling, keeping all state (host lost visibility)
    pub fn pause(&mut self) -> Result<(), TransitionError> {
        self.state.pause()?;
        self.scheduler.cancel();
        Ok(())
    }

    /// Resume scheduling after a pause; a crashed run stays crashed
    pub fn resume(&mut self) -> Result<(), TransitionError> {
        let was_paused = self.state.phase == GamePhase::Paused;
        self.state.resume()?;
        if was_paused {
            self.activate();
        }
        Ok(())
    }
}
