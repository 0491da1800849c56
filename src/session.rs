//! Fixed-interval game loop around [`CaptureEngine`].
//!
//! A [`Session`] owns one round. The host calls [`Session::handle`] for every input
//! intent and [`Session::advance`] once per frame with the wall-clock time that passed.
//! Simulation ticks are gated on an accumulator; freeze timers run on wall-clock time
//! and keep running while the round is paused.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, GameConfig, Variant};
use crate::game::{check_invariants, ActorId, CaptureEngine, Direction, TickReport};
use crate::scoring::{PointsTracker, Scoring};
use crate::snapshot::{RoundSnapshot, SnapshotError};

/// A control-surface intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Steer an actor.
    Steer(ActorId, Direction),
    /// Spend one of the actor's power-ups on a freeze.
    Freeze(ActorId),
    /// Suspend simulation ticks.
    Pause,
    /// Resume simulation ticks.
    Resume,
}

/// Result of a finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum Outcome {
    /// Single-actor round.
    Solo {
        /// Final score.
        score: u32,
    },
    /// Multi-actor round with a unique top score.
    Winner {
        /// The actor with the highest score.
        actor: ActorId,
        /// Final scores in actor order.
        scores: Vec<u32>,
    },
    /// Multi-actor round where the top score is shared.
    Draw {
        /// Final scores in actor order.
        scores: Vec<u32>,
    },
}

impl Outcome {
    /// Rank final scores. One score is a solo round; otherwise the highest score
    /// wins and exact equality at the top is a draw.
    #[must_use]
    pub fn rank(scores: Vec<u32>) -> Self {
        if let [score] = scores.as_slice() {
            return Outcome::Solo { score: *score };
        }
        let best = scores.iter().copied().max().unwrap_or(0);
        let mut leaders = scores.iter().zip(1..).filter(|&(&s, _)| s == best);
        match (leaders.next(), leaders.next()) {
            (Some((_, actor)), None) => Outcome::Winner { actor, scores },
            _ => Outcome::Draw { scores },
        }
    }
}

/// Where a round stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundStatus {
    /// Ticking.
    Running,
    /// Ticks suspended by the player.
    Paused,
    /// Terminal: every actor is dead, or the round was exited.
    Over(Outcome),
}

/// One round: engine, scorers, tick accumulator and power-up timers.
#[derive(Debug, Clone)]
pub struct Session<S = PointsTracker> {
    engine: CaptureEngine,
    scorers: Vec<S>,
    tick_interval: Duration,
    freeze_duration: Duration,
    timer: Duration,
    freeze_remaining: Duration,
    paused: bool,
    outcome: Option<Outcome>,
}

impl<S: Scoring + Default> Session<S> {
    /// Start a fresh round.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is not playable.
    pub fn new(config: &GameConfig, variant: Variant, seed: u64) -> Result<Self, ConfigError> {
        let engine = CaptureEngine::from_config(config, variant, seed)?;
        info!(
            ?variant,
            rows = config.rows,
            cols = config.cols,
            enemies = engine.enemies().len(),
            seed,
            "round started"
        );
        Ok(Self::with_engine(config, engine))
    }

    /// Wrap an already assembled engine, one default scorer per actor.
    #[must_use]
    pub fn with_engine(config: &GameConfig, engine: CaptureEngine) -> Self {
        let scorers = engine.actors().iter().map(|_| S::default()).collect();
        Self {
            engine,
            scorers,
            tick_interval: config.tick_interval(),
            freeze_duration: config.freeze_duration(),
            timer: Duration::ZERO,
            freeze_remaining: Duration::ZERO,
            paused: false,
            outcome: None,
        }
    }

    /// Replace the round with `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Corrupt`] if the snapshot has no actors; the session is
    /// left untouched.
    pub fn restore(&mut self, snapshot: RoundSnapshot) -> Result<(), SnapshotError> {
        if snapshot.engine.actors().is_empty() {
            return Err(SnapshotError::Corrupt("snapshot has no actors".into()));
        }
        self.scorers = snapshot
            .scores
            .iter()
            .map(|&counters| {
                let mut scorer = S::default();
                scorer.restore(counters);
                scorer
            })
            .collect();
        self.engine = snapshot.engine;
        self.timer = snapshot.timer;
        self.tick_interval = snapshot.tick_interval;
        self.freeze_remaining = snapshot.freeze_remaining;
        self.outcome = None;
        // Restored rounds start paused.
        self.paused = true;
        self.check_terminal();
        Ok(())
    }

    /// Restore the round from a snapshot file. On failure the round is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn load(&mut self, path: &Path) -> Result<(), SnapshotError> {
        let snapshot = RoundSnapshot::load(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "failed to load round");
        })?;
        self.restore(snapshot)?;
        info!(path = %path.display(), tick = self.engine.tick_count(), "round loaded");
        Ok(())
    }
}

impl<S: Scoring> Session<S> {
    /// The engine, for rendering and inspection.
    #[must_use]
    pub const fn engine(&self) -> &CaptureEngine {
        &self.engine
    }

    /// Scorers in actor order.
    #[must_use]
    pub fn scorers(&self) -> &[S] {
        &self.scorers
    }

    /// Current score of actor `id`.
    #[must_use]
    pub fn score(&self, id: ActorId) -> u32 {
        self.scorer(id).map_or(0, Scoring::current_score)
    }

    /// Unused power-ups of actor `id`.
    #[must_use]
    pub fn power_ups(&self, id: ActorId) -> u32 {
        self.scorer(id).map_or(0, Scoring::current_power_ups)
    }

    /// Scores in actor order.
    #[must_use]
    pub fn scores(&self) -> Vec<u32> {
        self.scorers.iter().map(Scoring::current_score).collect()
    }

    /// Time left on the active enemy freeze.
    #[must_use]
    pub const fn freeze_remaining(&self) -> Duration {
        self.freeze_remaining
    }

    /// Time accumulated towards the next tick.
    #[must_use]
    pub const fn timer(&self) -> Duration {
        self.timer
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> RoundStatus {
        match &self.outcome {
            Some(outcome) => RoundStatus::Over(outcome.clone()),
            None if self.paused => RoundStatus::Paused,
            None => RoundStatus::Running,
        }
    }

    /// Check if the round has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    fn scorer(&self, id: ActorId) -> Option<&S> {
        self.scorers.get(usize::from(id).checked_sub(1)?)
    }

    fn scorer_mut(&mut self, id: ActorId) -> Option<&mut S> {
        self.scorers.get_mut(usize::from(id).checked_sub(1)?)
    }

    /// Apply one intent. Returns `true` if it changed anything.
    pub fn handle(&mut self, intent: Intent) -> bool {
        if self.is_over() {
            return false;
        }
        match intent {
            Intent::Pause => !std::mem::replace(&mut self.paused, true),
            Intent::Resume => std::mem::replace(&mut self.paused, false),
            Intent::Steer(..) | Intent::Freeze(_) if self.paused => false,
            Intent::Steer(id, dir) => self.engine.steer(id, dir),
            Intent::Freeze(id) => self.activate_freeze(id),
        }
    }

    /// Freeze the enemies, and in a multi-actor round every other live actor too.
    fn activate_freeze(&mut self, id: ActorId) -> bool {
        let usable = self
            .engine
            .actor(id)
            .is_some_and(|a| a.alive && !a.is_frozen());
        if !usable || !self.freeze_remaining.is_zero() {
            return false;
        }
        if !self.scorer_mut(id).is_some_and(Scoring::consume_power_up) {
            return false;
        }

        let duration = self.freeze_duration;
        self.freeze_remaining = duration;
        self.engine.set_enemies_frozen(true);
        let others: Vec<ActorId> = self
            .engine
            .actors()
            .iter()
            .filter(|a| a.id != id && a.alive)
            .map(|a| a.id)
            .collect();
        for other in others {
            if let Some(actor) = self.engine.actor_mut(other) {
                actor.freeze(duration);
            }
        }
        info!(actor = id, ?duration, "freeze activated");
        true
    }

    /// Let `elapsed` wall-clock time pass.
    ///
    /// Freeze timers always decay. Unless the round is paused or over, the elapsed time
    /// is added to the tick accumulator; once it exceeds the tick interval one tick runs
    /// and the accumulator restarts from zero.
    pub fn advance(&mut self, elapsed: Duration) -> Option<TickReport> {
        self.decay_freezes(elapsed);
        if self.paused || self.is_over() {
            return None;
        }

        self.timer += elapsed;
        if self.timer <= self.tick_interval {
            return None;
        }
        self.timer = Duration::ZERO;

        let report = self.engine.tick();
        for capture in &report.captures {
            if let Some(scorer) = self.scorer_mut(capture.actor) {
                scorer.report_capture(capture.captured());
            }
        }
        debug_assert!(
            check_invariants(&self.engine).is_empty(),
            "{:?}",
            check_invariants(&self.engine)
        );
        self.check_terminal();
        Some(report)
    }

    fn decay_freezes(&mut self, elapsed: Duration) {
        if !self.freeze_remaining.is_zero() {
            self.freeze_remaining = self.freeze_remaining.saturating_sub(elapsed);
            if self.freeze_remaining.is_zero() {
                self.engine.set_enemies_frozen(false);
                debug!("freeze expired");
            }
        }
        let ids: Vec<ActorId> = self.engine.actors().iter().map(|a| a.id).collect();
        for id in ids {
            if let Some(actor) = self.engine.actor_mut(id) {
                actor.thaw(elapsed);
            }
        }
    }

    fn check_terminal(&mut self) {
        if self.outcome.is_none() && self.engine.live_actors() == 0 {
            let outcome = Outcome::rank(self.scores());
            info!(tick = self.engine.tick_count(), ?outcome, "round over");
            self.outcome = Some(outcome);
        }
    }

    /// End the round now and report the current scores.
    pub fn exit(&mut self) -> Outcome {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        let outcome = Outcome::rank(self.scores());
        info!(tick = self.engine.tick_count(), ?outcome, "round exited");
        self.outcome = Some(outcome.clone());
        outcome
    }

    /// Capture the complete round state.
    #[must_use]
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            engine: self.engine.clone(),
            timer: self.timer,
            tick_interval: self.tick_interval,
            freeze_remaining: self.freeze_remaining,
            scores: self.scorers.iter().map(Scoring::counters).collect(),
        }
    }

    /// Save the round to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        self.snapshot().save(path).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "failed to save round");
        })?;
        info!(path = %path.display(), tick = self.engine.tick_count(), "round saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Actor, Coord, Enemy, Grid};
    use tempfile::NamedTempFile;

    const STEP: Duration = Duration::from_millis(71);

    fn solo_session(rows: u16, cols: u16, start: Coord) -> Session {
        let engine = CaptureEngine::new(
            Grid::new(rows, cols).unwrap(),
            vec![Actor::new(1, start)],
            Vec::new(),
            18,
        );
        Session::with_engine(&GameConfig::default(), engine)
    }

    #[test]
    fn test_tick_gating() {
        let mut session = solo_session(5, 5, Coord::new(2, 0));
        assert!(session.advance(Duration::from_millis(40)).is_none());
        // Exactly the interval is not enough; the accumulator must exceed it.
        assert!(session.advance(Duration::from_millis(30)).is_none());
        let report = session.advance(Duration::from_millis(1)).unwrap();
        assert_eq!(report.tick, 1);
        assert_eq!(session.timer(), Duration::ZERO);
    }

    #[test]
    fn test_capture_reaches_scorer() {
        let mut session = solo_session(5, 5, Coord::new(2, 0));
        assert!(session.handle(Intent::Steer(1, Direction::Down)));
        for _ in 0..4 {
            session.advance(STEP);
        }
        assert_eq!(session.score(1), 9);
        assert_eq!(session.status(), RoundStatus::Running);
    }

    #[test]
    fn test_pause_blocks_ticks_and_input() {
        let mut session = solo_session(5, 5, Coord::new(2, 0));
        assert!(session.handle(Intent::Pause));
        assert!(!session.handle(Intent::Pause));
        assert_eq!(session.status(), RoundStatus::Paused);
        assert!(!session.handle(Intent::Steer(1, Direction::Down)));
        assert!(session.advance(STEP).is_none());
        assert_eq!(session.engine().tick_count(), 0);

        assert!(session.handle(Intent::Resume));
        assert!(session.advance(STEP).is_some());
    }

    #[test]
    fn test_freeze_needs_power_up() {
        let mut session: Session =
            Session::new(&GameConfig::default(), Variant::Single, 3).unwrap();
        assert!(!session.handle(Intent::Freeze(1)));
        assert!(!session.engine().enemies_frozen());
    }

    #[test]
    fn test_freeze_runs_on_wall_clock_while_paused() {
        let config = GameConfig::default();
        let mut session: Session = Session::new(&config, Variant::Dual, 3).unwrap();
        for _ in 0..5 {
            session.scorers[0].report_capture(10);
        }
        assert_eq!(session.power_ups(1), 1);

        assert!(session.handle(Intent::Freeze(1)));
        assert!(session.engine().enemies_frozen());
        assert!(session.engine().actor(2).unwrap().is_frozen());
        assert!(!session.engine().actor(1).unwrap().is_frozen());
        assert_eq!(session.power_ups(1), 0);

        // No stacking while a freeze is active.
        for _ in 0..5 {
            session.scorers[1].report_capture(10);
        }
        assert!(!session.handle(Intent::Freeze(2)));

        let enemies = session.engine().enemies().to_vec();
        session.handle(Intent::Pause);
        session.advance(Duration::from_millis(2000));
        assert!(session.engine().enemies_frozen());
        session.handle(Intent::Resume);
        session.advance(STEP);
        assert_eq!(session.engine().enemies(), &enemies[..]);

        session.advance(Duration::from_millis(1000));
        assert!(!session.engine().enemies_frozen());
        assert!(!session.engine().actor(2).unwrap().is_frozen());
    }

    #[test]
    fn test_round_over_when_actor_dies() {
        let grid = Grid::new(7, 7).unwrap();
        let enemy = Enemy::new(3 * 18 + 2, 3 * 18 + 2, 1, 1);
        let actors = vec![Actor::new(1, Coord::new(3, 0))];
        let engine = CaptureEngine::new(grid, actors, vec![enemy], 18);
        let mut session: Session = Session::with_engine(&GameConfig::default(), engine);
        session.handle(Intent::Steer(1, Direction::Down));
        for _ in 0..3 {
            session.advance(STEP);
        }
        assert_eq!(session.status(), RoundStatus::Over(Outcome::Solo { score: 0 }));
        assert!(session.advance(STEP).is_none());
        assert!(!session.handle(Intent::Pause));
    }

    #[test]
    fn test_outcome_ranking() {
        assert_eq!(Outcome::rank(vec![7]), Outcome::Solo { score: 7 });
        assert_eq!(
            Outcome::rank(vec![3, 9]),
            Outcome::Winner {
                actor: 2,
                scores: vec![3, 9]
            }
        );
        assert_eq!(
            Outcome::rank(vec![4, 4]),
            Outcome::Draw { scores: vec![4, 4] }
        );
    }

    #[test]
    fn test_exit_reports_current_scores() {
        let mut session = solo_session(5, 5, Coord::new(2, 0));
        session.handle(Intent::Steer(1, Direction::Down));
        for _ in 0..4 {
            session.advance(STEP);
        }
        assert_eq!(session.exit(), Outcome::Solo { score: 9 });
        assert!(session.is_over());
    }

    #[test]
    fn test_save_and_load() {
        let config = GameConfig::default();
        let mut session: Session = Session::new(&config, Variant::Dual, 21).unwrap();
        session.handle(Intent::Steer(1, Direction::Down));
        session.advance(STEP);
        session.advance(Duration::from_millis(20));
        let saved = session.snapshot();

        let file = NamedTempFile::new().unwrap();
        session.save(file.path()).unwrap();

        let mut other: Session = Session::new(&config, Variant::Single, 99).unwrap();
        other.load(file.path()).unwrap();
        assert_eq!(other.snapshot(), saved);
        assert_eq!(other.status(), RoundStatus::Paused);
    }

    #[test]
    fn test_failed_load_leaves_round_untouched() {
        let mut session: Session =
            Session::new(&GameConfig::default(), Variant::Single, 4).unwrap();
        let before = session.snapshot();

        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), [1, 2, 3]).unwrap();
        assert!(matches!(session.load(file.path()), Err(SnapshotError::Truncated)));
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.status(), RoundStatus::Running);
    }

    #[test]
    fn test_load_rejects_stationary_enemy() {
        let config = GameConfig::default();
        let saved: Session = Session::new(&config, Variant::Single, 8).unwrap();
        let file = NamedTempFile::new().unwrap();
        saved.save(file.path()).unwrap();

        // Zero the last enemy's velocity, the final 8 bytes of the record.
        let mut bytes = std::fs::read(file.path()).unwrap();
        let len = bytes.len();
        bytes[len - 8..].fill(0);
        std::fs::write(file.path(), &bytes).unwrap();

        let mut session: Session = Session::new(&config, Variant::Dual, 9).unwrap();
        let before = session.snapshot();
        assert!(matches!(session.load(file.path()), Err(SnapshotError::Corrupt(_))));
        assert_eq!(session.snapshot(), before);
        assert!(session.advance(STEP).is_some());
    }
}
