//! Round configuration.
//!
//! Every constant of a round lives in [`GameConfig`]. The defaults reproduce the classic
//! 40x25 board; a JSON file can override any subset of fields.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{pixel_extent, Coord};

/// Errors detected while setting up a round. Never raised mid-round.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The board needs at least one interior cell inside the border.
    #[error("grid must be at least 3x3, got {rows}x{cols}")]
    InvalidDimensions {
        /// Requested rows.
        rows: u16,
        /// Requested columns.
        cols: u16,
    },
    /// Enemy physics divides pixel positions by the tile size.
    #[error("tile size must be positive")]
    ZeroTileSize,
    /// Pixel coordinates of the board would not fit enemy physics.
    #[error("board of {rows}x{cols} tiles at {tile_size} px is too large")]
    BoardTooLarge {
        /// Requested rows.
        rows: u16,
        /// Requested columns.
        cols: u16,
        /// Requested tile size.
        tile_size: u16,
    },
    /// The simulation would never step.
    #[error("tick interval must be positive")]
    ZeroTickInterval,
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The configuration file is not valid JSON for [`GameConfig`].
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Difficulty level. Selects how many enemies a single-actor round starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Four enemies.
    #[default]
    One,
    /// Six enemies.
    Two,
    /// Eight enemies.
    Three,
}

impl Level {
    /// Enemies spawned at this level.
    #[must_use]
    pub const fn enemy_count(self) -> usize {
        match self {
            Level::One => 4,
            Level::Two => 6,
            Level::Three => 8,
        }
    }
}

/// Single- or dual-actor round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// One actor; the round ends when it dies.
    #[default]
    Single,
    /// Two actors; the round ends when both are dead.
    Dual,
}

impl Variant {
    /// Number of actors in this variant.
    #[must_use]
    pub const fn actor_count(self) -> usize {
        match self {
            Variant::Single => 1,
            Variant::Dual => 2,
        }
    }
}

/// Configuration for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Grid rows (M).
    pub rows: u16,
    /// Grid columns (N).
    pub cols: u16,
    /// Pixels per cell for enemy motion.
    pub tile_size: u16,
    /// Simulation step in milliseconds.
    pub tick_interval_ms: u64,
    /// Freeze power-up length in milliseconds.
    pub freeze_duration_ms: u64,
    /// Difficulty for single-actor rounds.
    pub level: Level,
    /// Enemies in a dual-actor round.
    pub dual_enemy_count: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 25,
            cols: 40,
            tile_size: 18,
            tick_interval_ms: 70,
            freeze_duration_ms: 3000,
            level: Level::One,
            dual_enemy_count: 4,
        }
    }
}

impl GameConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is playable.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < 3 || self.cols < 3 {
            return Err(ConfigError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.tile_size == 0 {
            return Err(ConfigError::ZeroTileSize);
        }
        if pixel_extent(self.rows.max(self.cols), self.tile_size).is_none() {
            return Err(ConfigError::BoardTooLarge {
                rows: self.rows,
                cols: self.cols,
                tile_size: self.tile_size,
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }

    /// Simulation step length.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Freeze power-up length.
    #[must_use]
    pub const fn freeze_duration(&self) -> Duration {
        Duration::from_millis(self.freeze_duration_ms)
    }

    /// Enemies spawned for `variant`.
    #[must_use]
    pub const fn enemy_count(&self, variant: Variant) -> usize {
        match variant {
            Variant::Single => self.level.enemy_count(),
            Variant::Dual => self.dual_enemy_count,
        }
    }

    /// Spawn cell of the actor at `index` (0-based). Always on the top border.
    #[must_use]
    pub fn spawn_cell(&self, index: usize) -> Coord {
        let last = self.cols.saturating_sub(1);
        let x = if index == 0 {
            10.min(last)
        } else {
            self.cols.saturating_sub(11)
        };
        Coord::new(x, 0)
    }

    /// Pixel position every enemy spawns at: the centre of the board.
    #[must_use]
    pub fn enemy_spawn(&self) -> (i32, i32) {
        let ts = i32::from(self.tile_size);
        (
            i32::from(self.cols) * ts / 2,
            i32::from(self.rows) * ts / 2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::CaptureEngine;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), Duration::from_millis(70));
        assert_eq!(config.freeze_duration(), Duration::from_secs(3));
        assert_eq!(config.enemy_count(Variant::Single), 4);
        assert_eq!(config.enemy_count(Variant::Dual), 4);
    }

    #[test]
    fn test_level_enemy_counts() {
        assert_eq!(Level::One.enemy_count(), 4);
        assert_eq!(Level::Two.enemy_count(), 6);
        assert_eq!(Level::Three.enemy_count(), 8);
    }

    #[test]
    fn test_validate_rejects_tiny_grid() {
        let config = GameConfig {
            rows: 2,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions { rows: 2, cols: 40 })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_tile_and_tick() {
        let config = GameConfig {
            tile_size: 0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTileSize)));

        let config = GameConfig {
            tick_interval_ms: 0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTickInterval)));
    }

    #[test]
    fn test_validate_rejects_oversized_pixel_board() {
        let config = GameConfig {
            rows: 3,
            cols: 40000,
            tile_size: 60000,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BoardTooLarge { cols: 40000, .. })
        ));
        assert!(matches!(
            CaptureEngine::from_config(&config, Variant::Single, 1),
            Err(ConfigError::BoardTooLarge { .. })
        ));

        let widest = GameConfig {
            rows: 3,
            cols: u16::MAX,
            tile_size: 1000,
            ..GameConfig::default()
        };
        assert!(widest.validate().is_ok());
        assert_eq!(widest.enemy_spawn(), (32_767_500, 1500));
    }

    #[test]
    fn test_spawn_cells_on_border() {
        let config = GameConfig::default();
        assert_eq!(config.spawn_cell(0), Coord::new(10, 0));
        assert_eq!(config.spawn_cell(1), Coord::new(29, 0));

        let small = GameConfig {
            rows: 5,
            cols: 5,
            ..GameConfig::default()
        };
        assert_eq!(small.spawn_cell(0), Coord::new(4, 0));
        assert_eq!(small.spawn_cell(1), Coord::new(0, 0));
    }

    #[test]
    fn test_load_partial_json() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{ "rows": 10, "cols": 12, "level": "three" }"#).unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.rows, 10);
        assert_eq!(config.cols, 12);
        assert_eq!(config.level, Level::Three);
        assert_eq!(config.tile_size, 18);
    }

    #[test]
    fn test_load_invalid_json() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "not json").unwrap();
        assert!(matches!(
            GameConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
