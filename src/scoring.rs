//! Scoring collaborator.
//!
//! The engine only reports how many tiles each closed loop captured. How that turns
//! into points and power-ups is the concern of a [`Scoring`] implementation;
//! [`PointsTracker`] is the classic policy.

use serde::{Deserialize, Serialize};

/// Raw counters of a scorer, persisted in round snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreCounters {
    /// Points scored.
    pub score: u32,
    /// Bonus streak used by the multiplier policy.
    pub bonus: u32,
    /// Unused power-ups.
    pub power_ups: u32,
    /// Score at which the next power-up is awarded.
    pub next_threshold: u32,
}

/// Receives capture events and owns score and power-up policy.
pub trait Scoring {
    /// Record a capture of `tiles` cells.
    fn report_capture(&mut self, tiles: u32);

    /// Points scored so far.
    fn current_score(&self) -> u32;

    /// Power-ups available.
    fn current_power_ups(&self) -> u32;

    /// Spend one power-up. Returns `false` if none was available.
    fn consume_power_up(&mut self) -> bool;

    /// Counters for a snapshot.
    fn counters(&self) -> ScoreCounters;

    /// Restore counters from a snapshot.
    fn restore(&mut self, counters: ScoreCounters);
}

/// First power-up threshold.
const FIRST_THRESHOLD: u32 = 50;

/// Classic scoring: streak multipliers and a power-up every few dozen points.
///
/// A capture scores one point per tile. The first three captures of more than ten
/// tiles score double; the next two double on more than five tiles; after that every
/// capture of more than five tiles scores quadruple. A power-up is awarded at 50 points,
/// then 20 points later, then every 30 points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointsTracker {
    counters: ScoreCounters,
}

impl Default for PointsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointsTracker {
    /// Create a tracker with no points.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counters: ScoreCounters {
                score: 0,
                bonus: 0,
                power_ups: 0,
                next_threshold: FIRST_THRESHOLD,
            },
        }
    }

    fn points_for(&mut self, tiles: u32) -> u32 {
        let bonus = self.counters.bonus;
        if (bonus < 3 && tiles > 10) || ((3..5).contains(&bonus) && tiles > 5) {
            self.counters.bonus += 1;
            tiles.saturating_mul(2)
        } else if bonus >= 5 && tiles > 5 {
            tiles.saturating_mul(4)
        } else {
            tiles
        }
    }
}

impl Scoring for PointsTracker {
    fn report_capture(&mut self, tiles: u32) {
        let points = self.points_for(tiles);
        let c = &mut self.counters;
        c.score = c.score.saturating_add(points);
        while c.score >= c.next_threshold && c.next_threshold < u32::MAX {
            c.power_ups += 1;
            let step = if c.next_threshold == FIRST_THRESHOLD { 20 } else { 30 };
            c.next_threshold = c.next_threshold.saturating_add(step);
        }
    }

    fn current_score(&self) -> u32 {
        self.counters.score
    }

    fn current_power_ups(&self) -> u32 {
        self.counters.power_ups
    }

    fn consume_power_up(&mut self) -> bool {
        if self.counters.power_ups == 0 {
            return false;
        }
        self.counters.power_ups -= 1;
        true
    }

    fn counters(&self) -> ScoreCounters {
        self.counters
    }

    fn restore(&mut self, counters: ScoreCounters) {
        self.counters = counters;
    }
}
