// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Xonix: a deterministic territory-capture arcade engine.
//!
//! One or two actors cross a bordered playfield, drawing trails through open sea.
//! Closing a trail onto claimed ground captures every cell the enemies can no longer
//! reach; an enemy touching an open trail kills its owner.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Front-ends (TUI, headless CLI)    │
//! ├─────────────────────────────────────┤
//! │   Session: tick gate, freezes,      │
//! │   pause, save/load, outcome         │
//! ├─────────────────────────────────────┤
//! │   CaptureEngine: actors, enemies,   │
//! │   collisions, enclosure flood-fill  │
//! └─────────────────────────────────────┘
//! ```

pub mod autopilot;
pub mod collab;
pub mod config;
pub mod game;
pub mod scoring;
pub mod session;
pub mod snapshot;

pub use autopilot::{play_round, run_round, Autopilot, RoundResult};
pub use collab::{CollabError, Leaderboard, Theme, ThemeCatalog};
pub use config::{ConfigError, GameConfig, Level, Variant};
pub use game::{
    Actor, ActorId, CaptureEngine, Cell, Coord, Direction, Enemy, Grid, TickReport,
};
pub use scoring::{PointsTracker, ScoreCounters, Scoring};
pub use session::{Intent, Outcome, RoundStatus, Session};
pub use snapshot::{RoundSnapshot, SnapshotError};
