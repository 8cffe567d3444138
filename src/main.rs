//! Dino Runner entry point
//!
//! Headless native demo: runs one session at a fixed 16ms step with a
//! simple autopilot until it crashes or the frame limit is reached.
//!
//! Usage: `dino-runner [preset] [seed] [best-score.json]`

use dino_runner::persistence::{BestScoreStore, JsonFileStore, MemoryStore};
use dino_runner::platform::ManualClock;
use dino_runner::renderer::{Rect, SpriteId, SpriteSink};
use dino_runner::sim::{GameEvent, GamePhase, GameState, InputEvent};
use dino_runner::{Preset, Session, Tuning, TuningOverrides};

const FRAME_MS: f64 = 16.0;
const MAX_FRAMES: u32 = 60 * 60 * 3;

/// Counts draw calls instead of drawing
#[derive(Default)]
struct NullSink {
    draws: u64,
}

impl SpriteSink for NullSink {
    fn draw_sprite(&mut self, _sprite: SpriteId<'_>, _source: Rect, _dest: Rect) {
        self.draws += 1;
    }
}

/// Pick the input for the upcoming obstacle, if any
fn autopilot(state: &GameState) -> Option<InputEvent> {
    let character = &state.character;
    let Some(obstacle) = state.horizon.leading_obstacle() else {
        return character.ducking.then_some(InputEvent::DuckEnd);
    };

    let ahead = obstacle.x_pos - (character.x_pos + character.footprint_width());
    let reaction = (state.speed * 12.0) as i32;
    let bottom = obstacle.y_pos + obstacle.kind.height;

    if ahead < -obstacle.width {
        return character.ducking.then_some(InputEvent::DuckEnd);
    }
    if ahead > reaction || character.jumping {
        return None;
    }
    if bottom <= character.ground_y_pos {
        // Flies over the character's head
        None
    } else if obstacle.y_pos <= character.ground_y_pos - 10 {
        (!character.ducking).then_some(InputEvent::DuckStart)
    } else {
        Some(InputEvent::JumpStart)
    }
}

fn run<S: BestScoreStore>(session: &mut Session<ManualClock, S>) -> NullSink {
    let mut sink = NullSink::default();
    if let Err(err) = session.apply_input(InputEvent::JumpStart) {
        log::warn!("Could not start: {err}");
        return sink;
    }

    for _ in 0..MAX_FRAMES {
        let Some(handle) = session.pending_frame() else {
            break;
        };
        session.clock().advance(FRAME_MS);
        let Some(report) = session.on_frame(handle, &mut sink) else {
            continue;
        };

        for event in &report.events {
            match event {
                GameEvent::Achievement { distance } => log::info!("Reached {distance}"),
                GameEvent::NightMode(on) => log::debug!("Night mode: {on}"),
                GameEvent::NewHighScore { distance } => log::info!("New high score {distance}"),
                _ => {}
            }
        }
        if report.phase == GamePhase::Crashed {
            break;
        }

        if let Some(input) = autopilot(session.state()) {
            if let Err(err) = session.apply_input(input) {
                log::debug!("Autopilot input {input:?} rejected: {err}");
            }
        }
    }
    sink
}

fn summarize<S: BestScoreStore>(session: &Session<ManualClock, S>, sink: &NullSink) {
    let state = session.state();
    log::info!(
        "Run finished: phase {:?}, distance {}, speed {:.3}, {} jumps, {} draw calls",
        state.phase,
        state.actual_distance(),
        state.speed,
        state.character.jump_count,
        sink.draws
    );
    println!(
        "distance {} (best {})",
        state.actual_distance(),
        session.store().read_best()
    );
}

fn main() {
    env_logger::init();
    log::info!("Dino Runner (headless) starting...");

    let mut args = std::env::args().skip(1);
    let preset = args
        .next()
        .and_then(|name| Preset::from_str(&name))
        .unwrap_or_default();
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5eed);
    let best_path = args.next();

    let tuning = match Tuning::resolve(preset, &TuningOverrides::default()) {
        Ok(tuning) => tuning,
        Err(err) => {
            log::error!("Invalid tuning: {err}");
            std::process::exit(1);
        }
    };

    let clock = ManualClock::new(0.0);
    let result = match best_path {
        Some(path) => JsonFileStore::open(path)
            .map_err(|err| err.to_string())
            .and_then(|store| {
                Session::new(tuning, seed, clock, store).map_err(|err| err.to_string())
            })
            .map(|mut session| {
                let sink = run(&mut session);
                summarize(&session, &sink);
            }),
        None => Session::new(tuning, seed, clock, MemoryStore::new())
            .map_err(|err| err.to_string())
            .map(|mut session| {
                let sink = run(&mut session);
                summarize(&session, &sink);
            }),
    };

    if let Err(err) = result {
        log::error!("{err}");
        std::process::exit(1);
    }
}
