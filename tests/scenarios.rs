//! Scenario tests for complete rounds.
//!
//! Small hand-built boards with known answers: loop captures, enemies trapped in a
//! loop, dual-actor head-on collisions and save/restore of a live round.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use tempfile::NamedTempFile;
use xonix::game::{resolve_enclosure, Actor, DeathCause};
use xonix::{
    CaptureEngine, Cell, Coord, Direction, Enemy, GameConfig, Grid, Intent, Outcome,
    RoundSnapshot, RoundStatus, ScoreCounters, Session, Variant,
};

/// Past the default 70 ms tick interval.
const STEP: Duration = Duration::from_millis(71);

/// 5x5 board whose 3x3 interior ring is actor 1's trail, leaving (2, 2) enclosed.
fn ringed_board() -> Grid {
    let mut grid = Grid::new(5, 5).unwrap();
    for (x, y) in [(1, 1), (2, 1), (3, 1), (3, 2), (3, 3), (2, 3), (1, 3), (1, 2)] {
        grid.set(Coord::new(x, y), Cell::Trail(1));
    }
    grid
}

#[test]
fn test_fresh_board_layout() {
    let grid = Grid::new(5, 5).unwrap();
    for (coord, cell) in grid.iter() {
        let expected = if grid.is_border(coord) {
            Cell::Claimed
        } else {
            Cell::Open
        };
        assert_eq!(cell, expected, "{coord:?}");
    }
    assert_eq!(grid.count_open(), 9);
}

#[test]
fn test_closed_ring_captures_interior() {
    let mut grid = ringed_board();
    let enclosure = resolve_enclosure(&mut grid, 1, []);
    assert_eq!(enclosure.captured(), 9);
    assert!(grid.cells().iter().all(|c| c.is_claimed()));
}

#[test]
fn test_enemy_inside_ring_keeps_its_cell() {
    let mut grid = ringed_board();
    let enclosure = resolve_enclosure(&mut grid, 1, [Coord::new(2, 2)]);
    assert_eq!(enclosure.captured(), 8);
    assert_eq!(grid.get(Coord::new(2, 2)), Cell::Open);
    assert_eq!(grid.count_trail(1), 0);
}

#[test]
fn test_walked_loop_around_frozen_enemy_spares_its_cell() {
    // Enter at (1, 1), circle clockwise around (2, 2) and leave through (0, 2).
    let grid = Grid::new(5, 5).unwrap();
    let enemy = Enemy::new(2 * 18 + 9, 2 * 18 + 9, 1, 1);
    let actors = vec![Actor::new(1, Coord::new(1, 0))];
    let mut engine = CaptureEngine::new(grid, actors, vec![enemy], 18);
    engine.set_enemies_frozen(true);

    let legs = [
        (Direction::Down, 1),
        (Direction::Right, 2),
        (Direction::Down, 2),
        (Direction::Left, 2),
        (Direction::Up, 1),
    ];
    for (dir, ticks) in legs {
        assert!(engine.steer(1, dir));
        for _ in 0..ticks {
            let report = engine.tick();
            assert!(report.captures.is_empty());
            assert!(report.deaths.is_empty());
        }
    }
    assert_eq!(engine.grid().count_trail(1), 8);

    assert!(engine.steer(1, Direction::Left));
    let report = engine.tick();
    assert_eq!(report.captures.len(), 1);
    assert_eq!(report.captures[0].captured(), 8);
    assert_eq!(engine.actor(1).unwrap().pos, Coord::new(0, 2));
    assert_eq!(engine.grid().get(Coord::new(2, 2)), Cell::Open);
    assert_eq!(engine.grid().count_open(), 1);
}

#[test]
fn test_enemy_in_far_region_limits_capture() {
    // Trail down column 3 of a 7x9 board splits the interior in two. The enemy sits in
    // the right half, so only the left half and the trail are captured.
    let grid = Grid::new(7, 9).unwrap();
    let enemy = Enemy::new(6 * 18 + 9, 3 * 18 + 9, 0, 0);
    let actors = vec![Actor::new(1, Coord::new(3, 0))];
    let mut engine = CaptureEngine::new(grid, actors, vec![enemy], 18);
    engine.set_enemies_frozen(true);
    engine.steer(1, Direction::Down);

    let mut captured = None;
    for _ in 0..6 {
        let report = engine.tick();
        if let Some(enclosure) = report.captures.first() {
            captured = Some(enclosure.captured());
        }
    }

    // Left half is columns 1-2 of rows 1-5 (10 cells), plus 5 trail cells.
    assert_eq!(captured, Some(15));
    // Right half is columns 4-7 of rows 1-5.
    assert_eq!(engine.grid().count_open(), 4 * 5);
    assert_eq!(engine.grid().get(Coord::new(6, 3)), Cell::Open);
}

fn head_on_session(scores: [u32; 2]) -> Session {
    let mut grid = Grid::new(7, 7).unwrap();
    grid.set(Coord::new(2, 3), Cell::Trail(1));
    grid.set(Coord::new(4, 3), Cell::Trail(2));
    let mut a = Actor::new(1, Coord::new(2, 3));
    a.drawing = true;
    a.dir = Direction::Right;
    let mut b = Actor::new(2, Coord::new(4, 3));
    b.drawing = true;
    b.dir = Direction::Left;
    let engine = CaptureEngine::new(grid, vec![a, b], Vec::new(), 18);

    let config = GameConfig::default();
    let mut session: Session = Session::with_engine(&config, engine.clone());
    session
        .restore(RoundSnapshot {
            engine,
            timer: Duration::ZERO,
            tick_interval: config.tick_interval(),
            freeze_remaining: Duration::ZERO,
            scores: scores
                .iter()
                .map(|&score| ScoreCounters {
                    score,
                    next_threshold: 50,
                    ..ScoreCounters::default()
                })
                .collect(),
        })
        .unwrap();
    session.handle(Intent::Resume);
    session
}

#[test]
fn test_dual_head_on_is_a_draw_on_equal_scores() {
    let mut session = head_on_session([20, 20]);
    let report = session.advance(STEP).unwrap();

    assert_eq!(report.deaths.len(), 2);
    assert!(report.deaths.iter().any(|d| d.actor == 1));
    assert!(report.deaths.iter().any(|d| d.actor == 2));
    assert!(report
        .deaths
        .iter()
        .all(|d| matches!(d.cause, DeathCause::HeadOn | DeathCause::OpponentTrail(_))));
    assert_eq!(
        session.status(),
        RoundStatus::Over(Outcome::Draw {
            scores: vec![20, 20]
        })
    );
}

#[test]
fn test_dual_head_on_ranks_by_score() {
    let mut session = head_on_session([12, 30]);
    session.advance(STEP);
    assert_eq!(
        session.status(),
        RoundStatus::Over(Outcome::Winner {
            actor: 2,
            scores: vec![12, 30]
        })
    );
}

#[test]
fn test_dual_round_continues_with_one_survivor() {
    let mut grid = Grid::new(7, 7).unwrap();
    grid.set(Coord::new(3, 2), Cell::Trail(2));
    let a = Actor::new(1, Coord::new(3, 0));
    let b = Actor::new(2, Coord::new(6, 3));
    let engine = CaptureEngine::new(grid, vec![a, b], Vec::new(), 18);
    let mut session: Session = Session::with_engine(&GameConfig::default(), engine);

    // Actor 1 steps onto (3, 1), then slides onto actor 2's trail at (3, 2).
    session.handle(Intent::Steer(1, Direction::Down));
    session.advance(STEP);
    let report = session.advance(STEP).unwrap();
    assert_eq!(report.deaths.len(), 1);
    assert_eq!(report.deaths[0].cause, DeathCause::OpponentTrail(2));
    assert_eq!(session.status(), RoundStatus::Running);
}

#[test]
fn test_save_then_load_round_trips_live_round() {
    let config = GameConfig::default();
    let mut session: Session = Session::new(&config, Variant::Dual, 77).unwrap();
    session.handle(Intent::Steer(1, Direction::Down));
    session.handle(Intent::Steer(2, Direction::Down));
    for _ in 0..3 {
        session.advance(STEP);
    }
    session.advance(Duration::from_millis(25));

    let file = NamedTempFile::new().unwrap();
    session.save(file.path()).unwrap();
    let bytes = std::fs::read(file.path()).unwrap();

    let mut restored: Session = Session::new(&config, Variant::Single, 1).unwrap();
    restored.load(file.path()).unwrap();
    assert_eq!(restored.snapshot(), session.snapshot());
    assert_eq!(restored.timer(), Duration::from_millis(25));

    // Saving the restored round reproduces the file byte for byte.
    let again = NamedTempFile::new().unwrap();
    restored.save(again.path()).unwrap();
    assert_eq!(std::fs::read(again.path()).unwrap(), bytes);
}

#[test]
fn test_truncated_save_is_rejected() {
    let config = GameConfig::default();
    let session: Session = Session::new(&config, Variant::Single, 5).unwrap();
    let file = NamedTempFile::new().unwrap();
    session.save(file.path()).unwrap();

    let bytes = std::fs::read(file.path()).unwrap();
    std::fs::write(file.path(), &bytes[..bytes.len() / 2]).unwrap();

    let mut other: Session = Session::new(&config, Variant::Dual, 6).unwrap();
    let before = other.snapshot();
    assert!(other.load(file.path()).is_err());
    assert_eq!(other.snapshot(), before);
}
