//! Output formatting utilities for CLI.

// Averages over round counts
#![allow(clippy::cast_precision_loss)]

use std::fmt::Write as _;

use serde::Serialize;
use xonix::{Leaderboard, Outcome, RoundResult, Theme};

/// Format a round result as human-readable text.
pub(super) fn format_round_text(result: &RoundResult) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Round Result (seed: {})", result.seed);
    match &result.outcome {
        Outcome::Solo { score } => {
            let _ = writeln!(output, "  Score: {score}");
        }
        Outcome::Winner { actor, .. } => {
            let _ = writeln!(output, "  Winner: Player {actor}");
        }
        Outcome::Draw { .. } => {
            let _ = writeln!(output, "  Winner: Draw");
        }
    }
    let _ = writeln!(output, "  Ticks: {}", result.ticks);
    let _ = writeln!(output, "  Open cells left: {}\n", result.open_cells);

    let scores = outcome_scores(&result.outcome);
    for (i, loops) in result.loops.iter().enumerate() {
        let score = scores.get(i).copied().unwrap_or(0);
        let _ = write!(output, "  Player {}: {score} points, {loops} loops", i + 1);
        if let Some(Some(tick)) = result.deaths.get(i) {
            let _ = write!(output, " [died tick {tick}]");
        }
        output.push('\n');
    }

    output
}

/// Scores in actor order, whatever the outcome kind.
pub(super) fn outcome_scores(outcome: &Outcome) -> Vec<u32> {
    match outcome {
        Outcome::Solo { score } => vec![*score],
        Outcome::Winner { scores, .. } | Outcome::Draw { scores } => scores.clone(),
    }
}

/// Aggregated statistics over many rounds.
#[derive(Debug, Default)]
pub(super) struct SweepStats {
    /// Total rounds played.
    pub(super) rounds_played: u64,
    /// Win count per actor.
    pub(super) wins: Vec<u64>,
    /// Draw count.
    pub(super) draws: u64,
    /// Rounds in which every actor died before the tick limit.
    pub(super) wipeouts: u64,
    /// Total score per actor.
    total_scores: Vec<f64>,
    /// Score sum of squares for std dev calculation.
    score_sq_sums: Vec<f64>,
    /// Total loops closed per actor.
    total_loops: Vec<u64>,
    /// Total ticks across all rounds.
    total_ticks: u64,
}

impl SweepStats {
    /// Create new stats for n actors.
    pub(super) fn new(num_actors: usize) -> Self {
        Self {
            rounds_played: 0,
            wins: vec![0; num_actors],
            draws: 0,
            wipeouts: 0,
            total_scores: vec![0.0; num_actors],
            score_sq_sums: vec![0.0; num_actors],
            total_loops: vec![0; num_actors],
            total_ticks: 0,
        }
    }

    /// Add a round result to the stats.
    pub(super) fn add_result(&mut self, result: &RoundResult) {
        self.rounds_played += 1;
        self.total_ticks += result.ticks;

        match result.outcome {
            Outcome::Winner { actor, .. } => {
                let idx = usize::from(actor) - 1;
                if idx < self.wins.len() {
                    self.wins[idx] += 1;
                }
            }
            Outcome::Draw { .. } => self.draws += 1,
            Outcome::Solo { .. } => {}
        }
        if result.deaths.iter().all(Option::is_some) {
            self.wipeouts += 1;
        }

        for (i, score) in outcome_scores(&result.outcome).into_iter().enumerate() {
            if i < self.total_scores.len() {
                let score = f64::from(score);
                self.total_scores[i] += score;
                self.score_sq_sums[i] += score * score;
            }
        }
        for (i, loops) in result.loops.iter().enumerate() {
            if let Some(total) = self.total_loops.get_mut(i) {
                *total += u64::from(*loops);
            }
        }
    }

    /// Fold another partial result into this one.
    pub(super) fn merge(&mut self, other: &Self) {
        self.rounds_played += other.rounds_played;
        self.draws += other.draws;
        self.wipeouts += other.wipeouts;
        self.total_ticks += other.total_ticks;
        for (a, b) in self.wins.iter_mut().zip(&other.wins) {
            *a += b;
        }
        for (a, b) in self.total_scores.iter_mut().zip(&other.total_scores) {
            *a += b;
        }
        for (a, b) in self.score_sq_sums.iter_mut().zip(&other.score_sq_sums) {
            *a += b;
        }
        for (a, b) in self.total_loops.iter_mut().zip(&other.total_loops) {
            *a += b;
        }
    }

    fn per_round(&self, total: f64) -> f64 {
        if self.rounds_played == 0 {
            return 0.0;
        }
        total / self.rounds_played as f64
    }

    /// Get win rate for an actor (0.0-1.0).
    pub(super) fn win_rate(&self, idx: usize) -> f64 {
        self.per_round(self.wins.get(idx).copied().unwrap_or(0) as f64)
    }

    /// Get average score for an actor.
    pub(super) fn avg_score(&self, idx: usize) -> f64 {
        self.per_round(self.total_scores.get(idx).copied().unwrap_or(0.0))
    }

    /// Get average loops closed by an actor.
    pub(super) fn avg_loops(&self, idx: usize) -> f64 {
        self.per_round(self.total_loops.get(idx).copied().unwrap_or(0) as f64)
    }

    /// Get score standard deviation for an actor.
    pub(super) fn score_std_dev(&self, idx: usize) -> f64 {
        if self.rounds_played == 0 {
            return 0.0;
        }
        let mean = self.avg_score(idx);
        let sq_mean = self.per_round(self.score_sq_sums.get(idx).copied().unwrap_or(0.0));
        let variance = sq_mean - mean * mean;
        if variance < 0.0 { 0.0 } else { variance.sqrt() }
    }

    /// Get average round length.
    pub(super) fn avg_ticks(&self) -> f64 {
        self.per_round(self.total_ticks as f64)
    }
}

/// JSON-serializable sweep result.
#[derive(Debug, Serialize)]
pub(super) struct JsonSweepResult {
    /// Total rounds played.
    rounds_played: u64,
    /// Per-actor statistics.
    players: Vec<JsonSweepPlayer>,
    /// Number of draws.
    draws: u64,
    /// Rounds where every actor died.
    wipeouts: u64,
    /// Average round length in ticks.
    avg_ticks: f64,
}

/// JSON-serializable per-actor sweep stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonSweepPlayer {
    /// Actor id (1-based).
    player: usize,
    /// Number of wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Average score.
    avg_score: f64,
    /// Score standard deviation.
    score_std_dev: f64,
    /// Average loops closed.
    avg_loops: f64,
}

impl JsonSweepResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &SweepStats) -> Self {
        let players = (0..stats.wins.len())
            .map(|i| JsonSweepPlayer {
                player: i + 1,
                wins: stats.wins[i],
                win_rate: stats.win_rate(i),
                avg_score: stats.avg_score(i),
                score_std_dev: stats.score_std_dev(i),
                avg_loops: stats.avg_loops(i),
            })
            .collect();

        Self {
            rounds_played: stats.rounds_played,
            players,
            draws: stats.draws,
            wipeouts: stats.wipeouts,
            avg_ticks: stats.avg_ticks(),
        }
    }
}

/// Format sweep stats as human-readable text.
pub(super) fn format_sweep_text(stats: &SweepStats) -> String {
    let mut output = String::new();
    let actors = stats.wins.len();

    let _ = writeln!(output, "Sweep Results ({} rounds)", stats.rounds_played);
    output.push_str("========================================\n\n");

    if actors > 1 {
        output.push_str("Win Rates:\n");
        for (i, wins) in stats.wins.iter().enumerate() {
            let _ = writeln!(
                output,
                "  Player {}: {:.1}% ({wins} wins)",
                i + 1,
                stats.win_rate(i) * 100.0
            );
        }
        let _ = writeln!(
            output,
            "  Draws: {} ({:.1}%)\n",
            stats.draws,
            stats.per_round(stats.draws as f64) * 100.0
        );
    }

    output.push_str("Average Scores:\n");
    for i in 0..actors {
        let _ = writeln!(
            output,
            "  Player {}: {:.1} (+/- {:.1}), {:.1} loops",
            i + 1,
            stats.avg_score(i),
            stats.score_std_dev(i),
            stats.avg_loops(i)
        );
    }

    let _ = writeln!(
        output,
        "\nWipeouts: {} ({:.1}%)",
        stats.wipeouts,
        stats.per_round(stats.wipeouts as f64) * 100.0
    );
    let _ = writeln!(output, "Average Round Length: {:.0} ticks", stats.avg_ticks());

    output
}

/// Format the theme catalog as text.
pub(super) fn format_themes_text<'a>(themes: impl Iterator<Item = &'a Theme>) -> String {
    let mut output = String::new();
    for theme in themes {
        let _ = writeln!(output, "{:>3}  {:<16} {}", theme.id, theme.name, theme.description);
    }
    output
}

/// Format the leaderboard as text.
pub(super) fn format_scores_text(board: &Leaderboard) -> String {
    if board.is_empty() {
        return "No scores recorded.\n".to_string();
    }
    let mut output = String::from("--  LEADERBOARD  --\n");
    for (rank, entry) in board.ranked().iter().enumerate() {
        let _ = writeln!(output, "{:>3}. {:<20} {:>8}", rank + 1, entry.name, entry.score);
    }
    output
}
