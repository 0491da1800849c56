//! The capture engine: one deterministic simulation tick.
//!
//! Per tick, in order:
//! 1. every live actor steps and applies its landing rule
//! 2. actor-vs-actor collisions (opponent trail, shared cell)
//! 3. enclosure resolution for every surviving actor that closed a loop
//!
//! An actor that closes its loop onto the cell another actor stands on dies before
//! the loop is resolved.
//! 4. enemy motion, unless frozen
//! 5. enemy-vs-trail collisions
//!
//! The outcome of a tick depends only on the previous state and the intents latched
//! since the last tick.

use tracing::{debug, info};

use crate::config::{ConfigError, GameConfig, Variant};
use crate::game::{
    resolve_enclosure, Actor, ActorId, Cell, Coord, Direction, Enclosure, Enemy, Grid, Landing,
    Rng,
};

/// Why an actor died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Ran into its own open trail.
    SelfCollision,
    /// Landed on the given actor's trail.
    OpponentTrail(ActorId),
    /// Shared a cell with another actor while drawing.
    HeadOn,
    /// An enemy touched its trail.
    Enemy,
}

/// A death recorded during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Death {
    /// The actor that died.
    pub actor: ActorId,
    /// What killed it.
    pub cause: DeathCause,
}

/// Everything that happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Loops closed this tick, in actor order.
    pub captures: Vec<Enclosure>,
    /// Deaths this tick, in the order they were adjudicated.
    pub deaths: Vec<Death>,
}

/// Owns the grid, actors and enemies of a round and advances them one tick at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureEngine {
    grid: Grid,
    actors: Vec<Actor>,
    enemies: Vec<Enemy>,
    tile_size: u16,
    enemies_frozen: bool,
    tick: u64,
}

impl CaptureEngine {
    /// Assemble an engine from explicit parts.
    ///
    /// Actors must be numbered `1..=n` in order.
    #[must_use]
    pub fn new(grid: Grid, actors: Vec<Actor>, enemies: Vec<Enemy>, tile_size: u16) -> Self {
        debug_assert!(actors
            .iter()
            .enumerate()
            .all(|(i, a)| usize::from(a.id) == i + 1));
        Self {
            grid,
            actors,
            enemies,
            tile_size: tile_size.max(1),
            enemies_frozen: false,
            tick: 0,
        }
    }

    /// Set up a fresh round.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is not playable.
    pub fn from_config(
        config: &GameConfig,
        variant: Variant,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::new(config.rows, config.cols).ok_or(ConfigError::InvalidDimensions {
            rows: config.rows,
            cols: config.cols,
        })?;

        let actors = (0..variant.actor_count())
            .zip(1..)
            .map(|(index, id)| Actor::new(id, config.spawn_cell(index)))
            .collect();

        let mut rng = Rng::new(seed);
        let (ex, ey) = config.enemy_spawn();
        let enemies = (0..config.enemy_count(variant))
            .map(|_| Enemy::spawn(ex, ey, &mut rng))
            .collect();

        Ok(Self::new(grid, actors, enemies, config.tile_size))
    }

    /// The playfield.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// All actors, dead ones included.
    #[must_use]
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// An actor by id.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    /// All enemies.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Pixels per cell.
    #[must_use]
    pub const fn tile_size(&self) -> u16 {
        self.tile_size
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Whether enemy motion is suspended.
    #[must_use]
    pub const fn enemies_frozen(&self) -> bool {
        self.enemies_frozen
    }

    /// Suspend or resume enemy motion. Positions and velocities are kept.
    pub fn set_enemies_frozen(&mut self, frozen: bool) {
        self.enemies_frozen = frozen;
    }

    /// Number of actors still alive.
    #[must_use]
    pub fn live_actors(&self) -> usize {
        self.actors.iter().filter(|a| a.alive).count()
    }

    /// Cells currently occupied by enemies.
    pub fn enemy_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        let ts = self.tile_size;
        self.enemies.iter().map(move |e| e.cell(ts))
    }

    /// Latch a directional intent for actor `id`. Returns `true` if accepted.
    pub fn steer(&mut self, id: ActorId, dir: Direction) -> bool {
        let Some(actor) = self.actors.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        let on_claimed = self.grid.get(actor.pos).is_claimed();
        actor.steer(dir, on_claimed)
    }

    /// Mutable access to actor `id`, for freeze timers.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.id == id)
    }

    /// Restore the tick counter and freeze flag from a snapshot.
    pub(crate) fn restore_clock(&mut self, tick: u64, enemies_frozen: bool) {
        self.tick = tick;
        self.enemies_frozen = enemies_frozen;
    }

    /// Run one simulation tick.
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        let alive_at_start: Vec<bool> = self.actors.iter().map(|a| a.alive).collect();

        let mut landings = Vec::with_capacity(self.actors.len());
        for actor in &mut self.actors {
            let landing = actor.step(&mut self.grid);
            if landing == Landing::SelfCollision {
                report.deaths.push(Death {
                    actor: actor.id,
                    cause: DeathCause::SelfCollision,
                });
            }
            landings.push(landing);
        }

        self.resolve_actor_collisions(&landings, &alive_at_start, &mut report);

        for (index, landing) in landings.iter().enumerate() {
            if *landing != Landing::ClosedLoop || !self.actors[index].alive {
                continue;
            }
            let id = self.actors[index].id;
            let seeds: Vec<Coord> = self.enemy_cells().collect();
            let enclosure = resolve_enclosure(&mut self.grid, id, seeds);
            self.actors[index].finish_loop();
            debug!(
                tick = self.tick,
                actor = id,
                captured = enclosure.captured(),
                "loop closed"
            );
            report.captures.push(enclosure);
        }

        if !self.enemies_frozen {
            for enemy in &mut self.enemies {
                enemy.advance(&self.grid, self.tile_size);
            }
            self.resolve_enemy_collisions(&mut report);
        }

        for death in &report.deaths {
            info!(tick = self.tick, actor = death.actor, cause = ?death.cause, "actor died");
        }

        report
    }

    /// Opponent-trail and shared-cell rules. Kills are decided on the post-movement
    /// state and applied together, so no ordering between actors leaks in.
    fn resolve_actor_collisions(
        &mut self,
        landings: &[Landing],
        alive_at_start: &[bool],
        report: &mut TickReport,
    ) {
        let mut doomed: Vec<(usize, DeathCause)> = Vec::new();

        for (index, landing) in landings.iter().enumerate() {
            if let Landing::OpponentTrail(owner) = *landing {
                doomed.push((index, DeathCause::OpponentTrail(owner)));
            }
        }

        // Drawing is read after movement, so an actor landing on claimed ground to close
        // its loop is still exposed.
        for i in 0..self.actors.len() {
            for j in (i + 1)..self.actors.len() {
                if !(alive_at_start[i] && alive_at_start[j]) {
                    continue;
                }
                if self.actors[i].pos != self.actors[j].pos {
                    continue;
                }
                for k in [i, j] {
                    if self.actors[k].drawing {
                        doomed.push((k, DeathCause::HeadOn));
                    }
                }
            }
        }

        for (index, cause) in doomed {
            let actor = &mut self.actors[index];
            if actor.alive {
                actor.kill();
                report.deaths.push(Death {
                    actor: actor.id,
                    cause,
                });
            }
        }
    }

    fn resolve_enemy_collisions(&mut self, report: &mut TickReport) {
        let ts = self.tile_size;
        for enemy in &self.enemies {
            let Some(Cell::Trail(owner)) = self.grid.try_get(enemy.cell(ts)) else {
                continue;
            };
            if let Some(actor) = self.actors.iter_mut().find(|a| a.id == owner && a.alive) {
                actor.kill();
                report.deaths.push(Death {
                    actor: owner,
                    cause: DeathCause::Enemy,
                });
            }
        }
    }
}
