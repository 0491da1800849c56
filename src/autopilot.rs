//! Seeded input source for headless rounds.
//!
//! Each actor runs the same plan: leave claimed ground heading inward, slide out a few
//! cells, turn once, slide along, then turn back towards the ground it came from. The
//! loop closes when it lands on claimed ground again. Enemies decide whether it
//! survives.
//!
//! [`run_round`] plays a whole round this way without a terminal.

use std::time::Duration;

use serde::Serialize;

use crate::config::{ConfigError, GameConfig, Variant};
use crate::game::{ActorId, ActorPhase, CaptureEngine, Cell, Direction, Rng};
use crate::scoring::Scoring;
use crate::session::{Intent, Outcome, Session};

const DIRECTIONS: [Direction; 4] = [
    Direction::Left,
    Direction::Right,
    Direction::Up,
    Direction::Down,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Idle,
    Out {
        dir: Direction,
        left: u32,
        side: Direction,
        width: u32,
    },
    Across {
        left: u32,
        back: Direction,
    },
    Back,
}

const fn opposite(dir: Direction) -> Direction {
    match dir {
        Direction::Left => Direction::Right,
        Direction::Right => Direction::Left,
        Direction::Up => Direction::Down,
        Direction::Down => Direction::Up,
        Direction::Still => Direction::Still,
    }
}

const fn perpendicular(dir: Direction, flip: bool) -> Direction {
    match (dir, flip) {
        (Direction::Left | Direction::Right, false) => Direction::Up,
        (Direction::Left | Direction::Right, true) => Direction::Down,
        (Direction::Up | Direction::Down, false) => Direction::Left,
        (Direction::Up | Direction::Down, true) => Direction::Right,
        (Direction::Still, _) => Direction::Still,
    }
}

/// Drives every actor of a round with seeded rectangular excursions.
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Rng,
    plans: Vec<Plan>,
    max_depth: u32,
}

impl Autopilot {
    /// Create a pilot for `actors` actors. Excursions reach at most `max_depth` cells
    /// out and across.
    #[must_use]
    pub fn new(seed: u64, actors: usize, max_depth: u32) -> Self {
        Self {
            rng: Rng::new(seed),
            plans: vec![Plan::Idle; actors],
            max_depth: max_depth.max(1),
        }
    }

    /// Intents for the coming tick.
    pub fn intents<S: Scoring>(&mut self, session: &Session<S>) -> Vec<Intent> {
        let engine = session.engine();
        let mut intents = Vec::new();
        for index in 0..self.plans.len() {
            let Ok(id) = ActorId::try_from(index + 1) else {
                break;
            };
            let Some(actor) = engine.actor(id) else {
                continue;
            };
            if actor.is_frozen() {
                continue;
            }
            match actor.phase() {
                ActorPhase::Dead => continue,
                ActorPhase::Queued => {}
                ActorPhase::OnGround => {
                    self.plans[index] = Plan::Idle;
                    if session.power_ups(id) > 0 && !engine.enemies_frozen() {
                        intents.push(Intent::Freeze(id));
                    }
                    if let Some(dir) = self.depart(engine, id) {
                        intents.push(Intent::Steer(id, dir));
                    }
                }
                ActorPhase::Drawing => {
                    if let Some(dir) = self.slide(index) {
                        intents.push(Intent::Steer(id, dir));
                    }
                }
            }
        }
        intents
    }

    fn random_dir(&mut self) -> Direction {
        DIRECTIONS[self.rng.next_u32(4) as usize]
    }

    fn span(&mut self) -> u32 {
        1 + self.rng.next_u32(self.max_depth)
    }

    /// Pick the first step from claimed ground. Prefers a neighbour that is open sea and
    /// plans the excursion; otherwise wanders along the ground.
    fn depart(&mut self, engine: &CaptureEngine, id: ActorId) -> Option<Direction> {
        let actor = engine.actor(id)?;
        let grid = engine.grid();
        let index = usize::from(id) - 1;

        let offset = self.rng.next_u32(4) as usize;
        let open = (0..4).map(|i| DIRECTIONS[(i + offset) % 4]).find(|&dir| {
            let (dx, dy) = dir.delta();
            let next = actor.pos.offset_clamped(dx, dy, grid.width(), grid.height());
            next != actor.pos && grid.get(next) == Cell::Open
        });

        match open {
            Some(dir) => {
                let flip = self.rng.next_u32(2) == 1;
                self.plans[index] = Plan::Out {
                    dir,
                    left: self.span(),
                    side: perpendicular(dir, flip),
                    width: self.span(),
                };
                Some(dir)
            }
            None => Some(self.random_dir()),
        }
    }

    /// Advance the plan of a drawing actor. Returns a new heading when it turns.
    fn slide(&mut self, index: usize) -> Option<Direction> {
        let (next, turn) = match self.plans[index] {
            Plan::Out {
                dir,
                left: 0,
                side,
                width,
            } => (
                Plan::Across {
                    left: width,
                    back: opposite(dir),
                },
                Some(side),
            ),
            Plan::Out {
                dir,
                left,
                side,
                width,
            } => (
                Plan::Out {
                    dir,
                    left: left - 1,
                    side,
                    width,
                },
                None,
            ),
            Plan::Across { left: 0, back } => (Plan::Back, Some(back)),
            Plan::Across { left, back } => (
                Plan::Across {
                    left: left - 1,
                    back,
                },
                None,
            ),
            plan @ (Plan::Back | Plan::Idle) => (plan, None),
        };
        self.plans[index] = next;
        turn
    }
}

/// Summary of a headless round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundResult {
    /// Seed for enemies and the autopilot.
    pub seed: u64,
    /// Ticks simulated.
    pub ticks: u64,
    /// Final result.
    pub outcome: Outcome,
    /// Tick each actor died on, in actor order. `None` if it survived.
    pub deaths: Vec<Option<u64>>,
    /// Loops closed by each actor.
    pub loops: Vec<u32>,
    /// Cells still open at the end.
    pub open_cells: u32,
}

/// Play one round with autopilot inputs for at most `max_ticks` ticks.
///
/// A round still running after `max_ticks` is exited and scored as it stands.
///
/// # Errors
///
/// Returns an error if the configuration is not playable.
pub fn run_round(
    config: &GameConfig,
    variant: Variant,
    seed: u64,
    max_ticks: u64,
) -> Result<RoundResult, ConfigError> {
    play_round(config, variant, seed, max_ticks).map(|(_, result)| result)
}

/// Like [`run_round`], also handing back the finished session.
///
/// # Errors
///
/// Returns an error if the configuration is not playable.
pub fn play_round(
    config: &GameConfig,
    variant: Variant,
    seed: u64,
    max_ticks: u64,
) -> Result<(Session, RoundResult), ConfigError> {
    let mut session: Session = Session::new(config, variant, seed)?;
    let depth = u32::from(config.rows.min(config.cols) / 3);
    let mut pilot = Autopilot::new(seed.rotate_left(17), variant.actor_count(), depth);
    let step = config.tick_interval() + Duration::from_nanos(1);

    let actors = variant.actor_count();
    let mut deaths = vec![None; actors];
    let mut loops = vec![0u32; actors];

    while !session.is_over() && session.engine().tick_count() < max_ticks {
        for intent in pilot.intents(&session) {
            session.handle(intent);
        }
        let Some(report) = session.advance(step) else {
            continue;
        };
        for capture in &report.captures {
            if let Some(count) = loops.get_mut(usize::from(capture.actor) - 1) {
                *count += 1;
            }
        }
        for death in &report.deaths {
            if let Some(slot) = deaths.get_mut(usize::from(death.actor) - 1) {
                *slot = Some(report.tick);
            }
        }
    }

    let outcome = session.exit();
    let result = RoundResult {
        seed,
        ticks: session.engine().tick_count(),
        outcome,
        deaths,
        loops,
        open_cells: session.engine().grid().count_open(),
    };
    Ok((session, result))
}
