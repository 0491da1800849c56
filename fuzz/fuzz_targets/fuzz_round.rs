#![no_main]

//! Full round fuzzer.
//!
//! Drives a session with arbitrary intents and frame times and checks the engine
//! invariants after every frame. Catches interactions between freezes, pause,
//! collisions and enclosure that the unit tests do not reach.

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use xonix::game::check_invariants;
use xonix::{Direction, GameConfig, Intent, Session, Variant};

/// A fuzzer-generated intent.
#[derive(Arbitrary, Debug, Clone, Copy)]
enum FuzzIntent {
    Steer { actor: u8, dir: u8 },
    Freeze { actor: u8 },
    Pause,
    Resume,
}

/// Structured input for round fuzzing.
#[derive(Arbitrary, Debug)]
struct RoundInput {
    rows: u8,
    cols: u8,
    dual: bool,
    seed: u64,
    /// Intent and milliseconds elapsed for each frame.
    frames: Vec<(FuzzIntent, u8)>,
}

fn direction(code: u8) -> Direction {
    match code % 5 {
        0 => Direction::Left,
        1 => Direction::Right,
        2 => Direction::Up,
        3 => Direction::Down,
        _ => Direction::Still,
    }
}

fuzz_target!(|input: RoundInput| {
    let config = GameConfig {
        rows: u16::from(input.rows % 30).max(3),
        cols: u16::from(input.cols % 50).max(3),
        ..GameConfig::default()
    };
    let variant = if input.dual { Variant::Dual } else { Variant::Single };
    let Ok(mut session) = Session::<xonix::PointsTracker>::new(&config, variant, input.seed) else {
        return;
    };

    for (intent, millis) in input.frames.into_iter().take(2000) {
        let intent = match intent {
            FuzzIntent::Steer { actor, dir } => Intent::Steer(actor % 3, direction(dir)),
            FuzzIntent::Freeze { actor } => Intent::Freeze(actor % 3),
            FuzzIntent::Pause => Intent::Pause,
            FuzzIntent::Resume => Intent::Resume,
        };
        session.handle(intent);
        session.advance(Duration::from_millis(u64::from(millis)));

        let violations = check_invariants(session.engine());
        assert!(violations.is_empty(), "{violations:?}");
    }
});
