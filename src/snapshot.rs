//! Round snapshots for save and restore.
//!
//! A snapshot is everything needed to resume a round: the grid, every actor and enemy,
//! the simulation clock and the score counters. The file is a fixed-layout binary
//! record (all integers little-endian):
//!
//! - 2 bytes each: `rows`, `cols`, `tile_size`
//! - `rows * cols` bytes: cell codes in row-major order
//! - 1 byte: `num_actors`, then for each actor:
//!   - 1 byte id, 2+2 bytes position, 1+1 bytes signed direction,
//!     1 byte flags (alive, drawing, queued), 8 bytes frozen time in nanoseconds
//! - 8 bytes each: tick counter, tick timer, tick interval, freeze time left (ns)
//! - 1 byte: enemies frozen
//! - For each actor: 4 bytes each of score, bonus, power-ups, next threshold
//! - 1 byte: `num_enemies`, then 4 bytes each of `x`, `y`, `dx`, `dy` per enemy
//!
//! There is no header, version or checksum. A truncated file is detected by a short
//! read. Values no round can hold are reported as corrupt: an unknown cell code, an open
//! border cell, a trail whose owner is unknown or not drawing, an actor off the grid,
//! an enemy off the board or without velocity.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::game::{pixel_extent, Actor, CaptureEngine, Cell, Coord, Direction, Enemy, Grid};
use crate::scoring::ScoreCounters;

const FLAG_ALIVE: u8 = 0b001;
const FLAG_DRAWING: u8 = 0b010;
const FLAG_QUEUED: u8 = 0b100;

/// Errors from saving or restoring a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The file could not be opened, created or written.
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The file ended before the record was complete.
    #[error("snapshot is truncated")]
    Truncated,
    /// The record holds a value no round can have.
    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),
}

/// A complete, serializable round state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSnapshot {
    /// Grid, actors and enemies, with the tick counter and enemy freeze flag.
    pub engine: CaptureEngine,
    /// Time accumulated towards the next tick.
    pub timer: Duration,
    /// Simulation step length.
    pub tick_interval: Duration,
    /// Time left on the active freeze power-up.
    pub freeze_remaining: Duration,
    /// Score counters, one per actor.
    pub scores: Vec<ScoreCounters>,
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

fn corrupt(message: impl Into<String>) -> SnapshotError {
    SnapshotError::Corrupt(message.into())
}

/// Little-endian reader that turns a short read into [`SnapshotError::Truncated`].
struct Decoder<R> {
    inner: R,
}

impl<R: Read> Decoder<R> {
    fn bytes<const N: usize>(&mut self) -> Result<[u8; N], SnapshotError> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                SnapshotError::Truncated
            } else {
                SnapshotError::Io(e)
            }
        })?;
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8, SnapshotError> {
        Ok(self.bytes::<1>()?[0])
    }

    fn i8(&mut self) -> Result<i8, SnapshotError> {
        Ok(i8::from_le_bytes(self.bytes()?))
    }

    fn u16(&mut self) -> Result<u16, SnapshotError> {
        Ok(u16::from_le_bytes(self.bytes()?))
    }

    fn u32(&mut self) -> Result<u32, SnapshotError> {
        Ok(u32::from_le_bytes(self.bytes()?))
    }

    fn i32(&mut self) -> Result<i32, SnapshotError> {
        Ok(i32::from_le_bytes(self.bytes()?))
    }

    fn u64(&mut self) -> Result<u64, SnapshotError> {
        Ok(u64::from_le_bytes(self.bytes()?))
    }

    fn duration(&mut self) -> Result<Duration, SnapshotError> {
        Ok(Duration::from_nanos(self.u64()?))
    }
}

impl RoundSnapshot {
    /// Write the record to `w`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        let grid = self.engine.grid();
        w.write_all(&grid.height().to_le_bytes())?;
        w.write_all(&grid.width().to_le_bytes())?;
        w.write_all(&self.engine.tile_size().to_le_bytes())?;
        let cells: Vec<u8> = grid.cells().iter().map(|c| c.code()).collect();
        w.write_all(&cells)?;

        let actors = self.engine.actors();
        w.write_all(&[u8::try_from(actors.len()).unwrap_or(u8::MAX)])?;
        for actor in actors {
            let (dx, dy) = actor.dir.delta();
            let mut flags = 0u8;
            if actor.alive {
                flags |= FLAG_ALIVE;
            }
            if actor.drawing {
                flags |= FLAG_DRAWING;
            }
            if actor.move_queued {
                flags |= FLAG_QUEUED;
            }
            w.write_all(&[actor.id])?;
            w.write_all(&actor.pos.x.to_le_bytes())?;
            w.write_all(&actor.pos.y.to_le_bytes())?;
            w.write_all(&i8::try_from(dx).unwrap_or_default().to_le_bytes())?;
            w.write_all(&i8::try_from(dy).unwrap_or_default().to_le_bytes())?;
            w.write_all(&[flags])?;
            w.write_all(&nanos(actor.frozen_for).to_le_bytes())?;
        }

        w.write_all(&self.engine.tick_count().to_le_bytes())?;
        w.write_all(&nanos(self.timer).to_le_bytes())?;
        w.write_all(&nanos(self.tick_interval).to_le_bytes())?;
        w.write_all(&nanos(self.freeze_remaining).to_le_bytes())?;
        w.write_all(&[u8::from(self.engine.enemies_frozen())])?;

        for counters in &self.scores {
            w.write_all(&counters.score.to_le_bytes())?;
            w.write_all(&counters.bonus.to_le_bytes())?;
            w.write_all(&counters.power_ups.to_le_bytes())?;
            w.write_all(&counters.next_threshold.to_le_bytes())?;
        }

        let enemies = self.engine.enemies();
        w.write_all(&[u8::try_from(enemies.len()).unwrap_or(u8::MAX)])?;
        for enemy in enemies {
            w.write_all(&enemy.x.to_le_bytes())?;
            w.write_all(&enemy.y.to_le_bytes())?;
            w.write_all(&enemy.dx.to_le_bytes())?;
            w.write_all(&enemy.dy.to_le_bytes())?;
        }

        Ok(())
    }

    /// Read a record from `r`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Truncated`] on a short read and
    /// [`SnapshotError::Corrupt`] on values no round can hold.
    pub fn read_from(r: &mut impl Read) -> Result<Self, SnapshotError> {
        let mut d = Decoder { inner: r };

        let rows = d.u16()?;
        let cols = d.u16()?;
        let tile_size = d.u16()?;
        if rows == 0 || cols == 0 || tile_size == 0 {
            return Err(corrupt(format!("bad dimensions {rows}x{cols}@{tile_size}")));
        }
        let (Some(width_px), Some(height_px)) =
            (pixel_extent(cols, tile_size), pixel_extent(rows, tile_size))
        else {
            return Err(corrupt(format!("board {rows}x{cols}@{tile_size} is too large")));
        };

        let mut cells = Vec::with_capacity(usize::from(rows) * usize::from(cols));
        for _ in 0..usize::from(rows) * usize::from(cols) {
            let code = d.u8()?;
            cells.push(Cell::from_code(code).ok_or_else(|| corrupt(format!("cell code {code}")))?);
        }
        let grid = Grid::from_cells(rows, cols, cells)
            .ok_or_else(|| corrupt("cell count does not match dimensions"))?;

        let num_actors = d.u8()?;
        let mut actors = Vec::with_capacity(usize::from(num_actors));
        for expected_id in 1..=num_actors {
            let id = d.u8()?;
            let pos = Coord::new(d.u16()?, d.u16()?);
            let dx = d.i8()?;
            let dy = d.i8()?;
            let flags = d.u8()?;
            let frozen_for = d.duration()?;

            if id != expected_id {
                return Err(corrupt(format!("actor id {id}, expected {expected_id}")));
            }
            if !grid.in_bounds(pos) {
                return Err(corrupt(format!("actor {id} at {pos:?} is off the grid")));
            }
            let dir = Direction::from_delta(i32::from(dx), i32::from(dy))
                .ok_or_else(|| corrupt(format!("actor {id} direction ({dx}, {dy})")))?;
            if flags & !(FLAG_ALIVE | FLAG_DRAWING | FLAG_QUEUED) != 0 {
                return Err(corrupt(format!("actor {id} flags {flags:#04x}")));
            }
            if flags & FLAG_ALIVE != 0 && flags & FLAG_DRAWING != 0 && flags & FLAG_QUEUED != 0 {
                return Err(corrupt(format!("actor {id} is queued while drawing")));
            }

            actors.push(Actor {
                id,
                pos,
                dir,
                drawing: flags & FLAG_DRAWING != 0,
                move_queued: flags & FLAG_QUEUED != 0,
                frozen_for,
                alive: flags & FLAG_ALIVE != 0,
            });
        }

        for (coord, cell) in grid.iter() {
            if grid.is_border(coord) && !cell.is_claimed() {
                return Err(corrupt(format!("border cell {coord:?} is {cell:?}")));
            }
            if let Cell::Trail(owner) = cell {
                let Some(actor) = usize::from(owner).checked_sub(1).and_then(|i| actors.get(i))
                else {
                    return Err(corrupt(format!(
                        "trail at {coord:?} owned by unknown actor {owner}"
                    )));
                };
                if !actor.drawing {
                    return Err(corrupt(format!(
                        "trail at {coord:?} owned by idle actor {owner}"
                    )));
                }
            }
        }

        let tick = d.u64()?;
        let timer = d.duration()?;
        let tick_interval = d.duration()?;
        let freeze_remaining = d.duration()?;
        let enemies_frozen = match d.u8()? {
            0 => false,
            1 => true,
            other => return Err(corrupt(format!("freeze flag {other}"))),
        };

        let mut scores = Vec::with_capacity(actors.len());
        for _ in 0..actors.len() {
            scores.push(ScoreCounters {
                score: d.u32()?,
                bonus: d.u32()?,
                power_ups: d.u32()?,
                next_threshold: d.u32()?,
            });
        }

        let num_enemies = d.u8()?;
        let mut enemies = Vec::with_capacity(usize::from(num_enemies));
        for index in 0..num_enemies {
            let enemy = Enemy::new(d.i32()?, d.i32()?, d.i32()?, d.i32()?);
            if !(0..width_px).contains(&enemy.x) || !(0..height_px).contains(&enemy.y) {
                return Err(corrupt(format!(
                    "enemy {index} at ({}, {}) is off the board",
                    enemy.x, enemy.y
                )));
            }
            let max_speed = u32::from(tile_size);
            if (enemy.dx == 0 && enemy.dy == 0)
                || enemy.dx.unsigned_abs() > max_speed
                || enemy.dy.unsigned_abs() > max_speed
            {
                return Err(corrupt(format!(
                    "enemy {index} velocity ({}, {})",
                    enemy.dx, enemy.dy
                )));
            }
            enemies.push(enemy);
        }

        let mut engine = CaptureEngine::new(grid, actors, enemies, tile_size);
        engine.restore_clock(tick, enemies_frozen);

        Ok(Self {
            engine,
            timer,
            tick_interval,
            freeze_remaining,
            scores,
        })
    }

    /// Encode into a byte vector.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    /// Decode from a byte slice.
    ///
    /// # Errors
    ///
    /// See [`RoundSnapshot::read_from`].
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, SnapshotError> {
        Self::read_from(&mut bytes)
    }

    /// Save the snapshot to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file operations fail.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let mut file = BufWriter::new(File::create(path)?);
        self.write_to(&mut file)?;
        file.flush()?;
        Ok(())
    }

    /// Load a snapshot from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is short, or is corrupt.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let mut file = BufReader::new(File::open(path)?);
        Self::read_from(&mut file)
    }
}
