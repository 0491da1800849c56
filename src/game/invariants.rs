//! Engine invariants - sanity checks that detect bugs.
//!
//! These should NEVER trigger in a correctly implemented engine. They are checked
//! after every tick in debug builds and exercised heavily by the property tests.

use crate::game::{CaptureEngine, Cell};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all engine invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(engine: &CaptureEngine) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let grid = engine.grid();

    for (coord, cell) in grid.iter() {
        // Border is always claimed
        if grid.is_border(coord) && !cell.is_claimed() {
            violations.push(InvariantViolation {
                message: format!("Border cell {coord:?} is {cell:?}"),
            });
        }

        // Scratch never survives an enclosure pass
        if cell == Cell::Scratch {
            violations.push(InvariantViolation {
                message: format!("Scratch cell left at {coord:?}"),
            });
        }

        // Trails belong to actors that exist
        if let Cell::Trail(owner) = cell {
            if engine.actor(owner).is_none() {
                violations.push(InvariantViolation {
                    message: format!("Trail at {coord:?} owned by unknown actor {owner}"),
                });
            }
        }
    }

    for actor in engine.actors() {
        if !grid.in_bounds(actor.pos) {
            violations.push(InvariantViolation {
                message: format!("Actor {} at {:?} is off the grid", actor.id, actor.pos),
            });
        }
        if actor.alive && actor.move_queued && actor.drawing {
            violations.push(InvariantViolation {
                message: format!("Actor {} has a queued step while drawing", actor.id),
            });
        }
    }

    for (index, enemy) in engine.enemies().iter().enumerate() {
        if !grid.in_bounds(enemy.cell(engine.tile_size())) {
            violations.push(InvariantViolation {
                message: format!("Enemy {index} at ({}, {}) is off the grid", enemy.x, enemy.y),
            });
        }
        if enemy.dx == 0 && enemy.dy == 0 {
            violations.push(InvariantViolation {
                message: format!("Enemy {index} has zero velocity"),
            });
        }
    }

    violations
}
