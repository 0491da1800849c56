//! CLI command implementations for Xonix.

pub(crate) mod catalog;
pub(crate) mod play;
pub(crate) mod simulate;
pub(crate) mod sweep;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use xonix::{GameConfig, Level, Variant};

/// Output format for the headless commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Difficulty level on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LevelArg {
    /// Four enemies.
    One,
    /// Six enemies.
    Two,
    /// Eight enemies.
    Three,
}

impl From<LevelArg> for Level {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::One => Level::One,
            LevelArg::Two => Level::Two,
            LevelArg::Three => Level::Three,
        }
    }
}

/// Everything needed to start a round, resolved from the command line.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RoundSetup {
    /// Validated configuration.
    pub(crate) config: GameConfig,
    /// Single or dual.
    pub(crate) variant: Variant,
    /// Seed for enemies and the autopilot.
    pub(crate) seed: u64,
}

impl RoundSetup {
    /// Resolve flags into a validated setup.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or is not playable.
    pub(crate) fn new(
        dual: bool,
        level: Option<LevelArg>,
        config: Option<PathBuf>,
        seed: Option<u64>,
    ) -> Result<Self, CliError> {
        let mut config = match config {
            Some(path) => GameConfig::load(&path)?,
            None => GameConfig::default(),
        };
        if let Some(level) = level {
            config.level = level.into();
        }
        config.validate()?;

        Ok(Self {
            config,
            variant: if dual { Variant::Dual } else { Variant::Single },
            seed: seed.unwrap_or_else(random_seed),
        })
    }
}

/// Seed from the wall clock.
#[allow(clippy::cast_possible_truncation)]
fn random_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<xonix::ConfigError> for CliError {
    fn from(e: xonix::ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<xonix::SnapshotError> for CliError {
    fn from(e: xonix::SnapshotError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<xonix::CollabError> for CliError {
    fn from(e: xonix::CollabError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}
