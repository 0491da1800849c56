//! Actor state: the player-controlled cursor that draws trails.
//!
//! An actor is a small state machine:
//!
//! ```text
//!  OnGround --steer--> Queued --tick--> OnGround   (landed on claimed ground)
//!                         \--tick--> Drawing       (landed on open sea)
//!  Drawing --tick--> Drawing | OnGround (loop closed) | Dead
//! ```
//!
//! On claimed ground every move is a single latched step; off it the actor slides one
//! cell per tick in the held direction.

use std::time::Duration;

use crate::game::{Cell, Coord, Grid};

/// Identifier for an actor. Actors are numbered from 1.
pub type ActorId = u8;

/// An axis-aligned heading, or standing still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// No movement.
    #[default]
    Still,
    /// Towards column 0.
    Left,
    /// Towards the last column.
    Right,
    /// Towards row 0.
    Up,
    /// Towards the last row.
    Down,
}

impl Direction {
    /// Unit step as `(dx, dy)`.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Still => (0, 0),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// Inverse of [`Direction::delta`].
    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, 0) => Some(Direction::Still),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            _ => None,
        }
    }
}

/// Observable phase of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorPhase {
    /// Idle on claimed ground, waiting for input.
    OnGround,
    /// One step latched while on claimed ground.
    Queued,
    /// Off claimed ground, laying a trail.
    Drawing,
    /// Terminal.
    Dead,
}

/// What happened when an actor stepped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// The actor did not move this tick.
    Idle,
    /// Moved without changing any cell or flag of note.
    Moved,
    /// Landed on claimed ground without an open trail.
    Ground,
    /// Landed on claimed ground with an open trail: the loop is closed.
    ClosedLoop,
    /// Landed on open sea and marked it as trail.
    Trail,
    /// Ran into its own open trail. The actor is now dead.
    SelfCollision,
    /// Landed on another actor's trail.
    OpponentTrail(ActorId),
}

/// State for a single actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Unique identifier for this actor.
    pub id: ActorId,
    /// Current cell.
    pub pos: Coord,
    /// Current heading.
    pub dir: Direction,
    /// Whether a trail is currently open.
    pub drawing: bool,
    /// Whether a single step is latched while on claimed ground.
    pub move_queued: bool,
    /// Remaining time this actor is frozen by an opponent's power-up.
    pub frozen_for: Duration,
    /// Whether the actor is still alive.
    pub alive: bool,
}

impl Actor {
    /// Create an idle actor at `spawn`.
    #[must_use]
    pub const fn new(id: ActorId, spawn: Coord) -> Self {
        Self {
            id,
            pos: spawn,
            dir: Direction::Still,
            drawing: false,
            move_queued: false,
            frozen_for: Duration::ZERO,
            alive: true,
        }
    }

    /// Current phase of the state machine.
    #[must_use]
    pub const fn phase(&self) -> ActorPhase {
        if !self.alive {
            ActorPhase::Dead
        } else if self.drawing {
            ActorPhase::Drawing
        } else if self.move_queued {
            ActorPhase::Queued
        } else {
            ActorPhase::OnGround
        }
    }

    /// Check if the actor currently ignores input and movement.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        !self.frozen_for.is_zero()
    }

    /// Apply a directional intent.
    ///
    /// On claimed ground the direction is latched as a single queued step, and further
    /// input is ignored until that step is taken. Off claimed ground the intent changes
    /// the held heading. Returns `true` if the intent was accepted.
    pub fn steer(&mut self, dir: Direction, on_claimed: bool) -> bool {
        if !self.alive || self.is_frozen() || dir == Direction::Still {
            return false;
        }
        if on_claimed {
            if self.move_queued {
                return false;
            }
            self.move_queued = true;
        }
        self.dir = dir;
        true
    }

    /// Advance one tick and apply the landing-cell rule.
    ///
    /// Only writes the landing cell (open sea becomes this actor's trail).
    pub fn step(&mut self, grid: &mut Grid) -> Landing {
        if !self.alive || self.is_frozen() {
            return Landing::Idle;
        }

        let (dx, dy) = self.dir.delta();
        if grid.get(self.pos).is_claimed() {
            if !self.move_queued {
                return Landing::Idle;
            }
            self.move_queued = false;
        } else if self.dir == Direction::Still {
            return Landing::Idle;
        }
        self.pos = self.pos.offset_clamped(dx, dy, grid.width(), grid.height());

        match grid.get(self.pos) {
            Cell::Open => {
                grid.set(self.pos, Cell::Trail(self.id));
                self.drawing = true;
                Landing::Trail
            }
            Cell::Trail(owner) if owner == self.id => {
                if self.drawing {
                    self.alive = false;
                    Landing::SelfCollision
                } else {
                    Landing::Moved
                }
            }
            Cell::Trail(owner) => Landing::OpponentTrail(owner),
            Cell::Claimed if self.drawing => Landing::ClosedLoop,
            Cell::Claimed => {
                self.dir = Direction::Still;
                Landing::Ground
            }
            Cell::Scratch => Landing::Moved,
        }
    }

    /// Return to idle after the loop this actor closed has been resolved.
    pub fn finish_loop(&mut self) {
        self.drawing = false;
        self.dir = Direction::Still;
    }

    /// Mark this actor dead. It stays on the board as an inert marker.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Freeze this actor for `duration`.
    pub fn freeze(&mut self, duration: Duration) {
        self.frozen_for = duration;
    }

    /// Let `elapsed` wall-clock time pass on the freeze timer.
    pub fn thaw(&mut self, elapsed: Duration) {
        self.frozen_for = self.frozen_for.saturating_sub(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Grid, Actor) {
        (Grid::new(5, 5).unwrap(), Actor::new(1, Coord::new(1, 0)))
    }

    #[test]
    fn test_actor_creation() {
        let (_, actor) = setup();
        assert_eq!(actor.phase(), ActorPhase::OnGround);
        assert_eq!(actor.dir, Direction::Still);
        assert!(actor.alive);
        assert!(!actor.is_frozen());
    }

    #[test]
    fn test_idle_on_ground_does_not_move() {
        let (mut grid, mut actor) = setup();
        assert_eq!(actor.step(&mut grid), Landing::Idle);
        assert_eq!(actor.pos, Coord::new(1, 0));
    }

    #[test]
    fn test_queued_step_enters_open_sea() {
        let (mut grid, mut actor) = setup();
        assert!(actor.steer(Direction::Down, true));
        assert_eq!(actor.phase(), ActorPhase::Queued);

        // A second intent is ignored while the first is pending.
        assert!(!actor.steer(Direction::Right, true));
        assert_eq!(actor.dir, Direction::Down);

        assert_eq!(actor.step(&mut grid), Landing::Trail);
        assert_eq!(actor.pos, Coord::new(1, 1));
        assert_eq!(grid.get(Coord::new(1, 1)), Cell::Trail(1));
        assert_eq!(actor.phase(), ActorPhase::Drawing);
    }

    #[test]
    fn test_drawing_slides_without_input() {
        let (mut grid, mut actor) = setup();
        actor.steer(Direction::Down, true);
        actor.step(&mut grid);
        assert_eq!(actor.step(&mut grid), Landing::Trail);
        assert_eq!(actor.pos, Coord::new(1, 2));
        assert_eq!(actor.step(&mut grid), Landing::Trail);
        assert_eq!(actor.pos, Coord::new(1, 3));
        assert_eq!(actor.step(&mut grid), Landing::ClosedLoop);
        assert_eq!(actor.pos, Coord::new(1, 4));

        actor.finish_loop();
        assert_eq!(actor.phase(), ActorPhase::OnGround);
        assert_eq!(actor.dir, Direction::Still);
    }

    #[test]
    fn test_step_along_border_stays_on_ground() {
        let (mut grid, mut actor) = setup();
        actor.steer(Direction::Right, true);
        assert_eq!(actor.step(&mut grid), Landing::Ground);
        assert_eq!(actor.pos, Coord::new(2, 0));
        assert_eq!(actor.phase(), ActorPhase::OnGround);
    }

    #[test]
    fn test_position_is_clamped() {
        let (mut grid, mut actor) = setup();
        actor.steer(Direction::Up, true);
        assert_eq!(actor.step(&mut grid), Landing::Ground);
        assert_eq!(actor.pos, Coord::new(1, 0));
    }

    #[test]
    fn test_self_collision_is_fatal() {
        let (mut grid, mut actor) = setup();
        actor.steer(Direction::Down, true);
        actor.step(&mut grid);
        actor.step(&mut grid);
        assert!(actor.steer(Direction::Up, false));
        assert_eq!(actor.step(&mut grid), Landing::SelfCollision);
        assert_eq!(actor.phase(), ActorPhase::Dead);
        assert_eq!(actor.step(&mut grid), Landing::Idle);
    }

    #[test]
    fn test_opponent_trail_is_reported() {
        let (mut grid, mut actor) = setup();
        grid.set(Coord::new(1, 1), Cell::Trail(2));
        actor.steer(Direction::Down, true);
        assert_eq!(actor.step(&mut grid), Landing::OpponentTrail(2));
    }

    #[test]
    fn test_frozen_actor_ignores_input() {
        let (mut grid, mut actor) = setup();
        actor.freeze(Duration::from_secs(3));
        assert!(!actor.steer(Direction::Down, true));
        assert_eq!(actor.step(&mut grid), Landing::Idle);

        actor.thaw(Duration::from_secs(2));
        assert!(actor.is_frozen());
        actor.thaw(Duration::from_secs(2));
        assert!(!actor.is_frozen());
        assert!(actor.steer(Direction::Down, true));
    }

    #[test]
    fn test_direction_delta_roundtrip() {
        for dir in [
            Direction::Still,
            Direction::Left,
            Direction::Right,
            Direction::Up,
            Direction::Down,
        ] {
            let (dx, dy) = dir.delta();
            assert_eq!(Direction::from_delta(dx, dy), Some(dir));
        }
        assert_eq!(Direction::from_delta(1, 1), None);
    }
}
