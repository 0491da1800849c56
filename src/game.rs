//! Simulation core for Xonix.
//!
//! Implements the territory-capture rules:
//! - Bordered grid of open, claimed and trail cells
//! - Actors that draw trails and close loops
//! - Enclosure resolution by enemy-seeded flood-fill
//! - Bouncing enemies and collision adjudication

pub mod actor;
pub mod enclosure;
pub mod enemy;
pub mod engine;
pub mod grid;
pub mod invariants;

pub use actor::{Actor, ActorId, ActorPhase, Direction, Landing};
pub use enclosure::{mark_reachable, resolve_enclosure, Enclosure};
pub use enemy::{pixel_extent, Enemy, Rng};
pub use engine::{CaptureEngine, Death, DeathCause, TickReport};
pub use grid::{Cell, Coord, Grid};
pub use invariants::{check_invariants, InvariantViolation};
