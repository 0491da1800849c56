//! Enclosure resolution.
//!
//! When an actor closes a trail loop, every open cell that no enemy can still reach
//! becomes claimed, together with that actor's trail. Reachability is computed by a
//! single flood-fill seeded from all enemy cells, so open pockets anywhere on the board
//! are handled in one linear pass.

use crate::game::{ActorId, Cell, Coord, Grid};

/// Result of one enclosure pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enclosure {
    /// The actor whose loop closed.
    pub actor: ActorId,
    /// Trail cells converted to claimed ground.
    pub trail_cells: u32,
    /// Open cells before the pass.
    pub open_before: u32,
    /// Open cells after the pass.
    pub open_after: u32,
}

impl Enclosure {
    /// Tiles captured by this pass: the trail plus every enclosed open cell.
    #[must_use]
    pub const fn captured(&self) -> u32 {
        self.trail_cells + (self.open_before - self.open_after)
    }
}

/// Mark every open cell reachable from `seeds` as [`Cell::Scratch`].
///
/// Seeds that are not open are skipped. Uses an explicit stack, so depth does not
/// depend on region size. Returns the number of cells marked.
pub fn mark_reachable(grid: &mut Grid, seeds: impl IntoIterator<Item = Coord>) -> u32 {
    let width = grid.width();
    let height = grid.height();
    let mut stack: Vec<Coord> = Vec::new();
    let mut marked = 0u32;

    for seed in seeds {
        if grid.try_get(seed) == Some(Cell::Open) {
            grid.set(seed, Cell::Scratch);
            marked += 1;
            stack.push(seed);
        }
    }

    while let Some(coord) = stack.pop() {
        let (adjacent, count) = coord.adjacent(width, height);
        for &next in &adjacent[..count as usize] {
            if grid.get(next) == Cell::Open {
                grid.set(next, Cell::Scratch);
                marked += 1;
                stack.push(next);
            }
        }
    }

    marked
}

/// Claim the region closed by `actor`'s trail.
///
/// Open cells not reachable from any of `enemy_cells` and every trail cell owned by
/// `actor` become claimed; reached cells revert to open. Other actors' trails are left
/// untouched. An enemy inside the loop keeps its pocket open.
pub fn resolve_enclosure(
    grid: &mut Grid,
    actor: ActorId,
    enemy_cells: impl IntoIterator<Item = Coord>,
) -> Enclosure {
    let trail_cells = grid.count_trail(actor);
    let open_before = grid.count_open();

    mark_reachable(grid, enemy_cells);

    grid.update_all(|_, cell| match cell {
        Cell::Scratch => Cell::Open,
        Cell::Open => Cell::Claimed,
        Cell::Trail(owner) if owner == actor => Cell::Claimed,
        other => other,
    });

    let open_after = grid.count_open();

    Enclosure {
        actor,
        trail_cells,
        open_before,
        open_after,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 5x5 grid with a closed 3x3 ring of actor 1's trail around (2, 2).
    fn ringed_grid() -> Grid {
        let mut grid = Grid::new(5, 5).unwrap();
        for y in 1..=3 {
            for x in 1..=3 {
                if (x, y) != (2, 2) {
                    grid.set(Coord::new(x, y), Cell::Trail(1));
                }
            }
        }
        grid
    }

    #[test]
    fn test_enclosure_without_enemies_claims_everything() {
        let mut grid = ringed_grid();
        let result = resolve_enclosure(&mut grid, 1, []);

        assert_eq!(result.trail_cells, 8);
        assert_eq!(result.open_before, 1);
        assert_eq!(result.open_after, 0);
        assert_eq!(result.captured(), 9);
        assert!(grid.cells().iter().all(|c| c.is_claimed()));
    }

    #[test]
    fn test_enemy_inside_loop_keeps_pocket_open() {
        let mut grid = ringed_grid();
        let result = resolve_enclosure(&mut grid, 1, [Coord::new(2, 2)]);

        assert_eq!(result.captured(), 8);
        assert_eq!(grid.get(Coord::new(2, 2)), Cell::Open);
    }

    #[test]
    fn test_reachable_region_stays_open() {
        // 7x7: actor 1 walls off column 1 rows 1..=5; enemy roams the rest.
        let mut grid = Grid::new(7, 7).unwrap();
        for y in 1..=5 {
            grid.set(Coord::new(2, y), Cell::Trail(1));
        }
        let result = resolve_enclosure(&mut grid, 1, [Coord::new(4, 3)]);

        // Column 1 (5 cells) is enclosed, columns 3..=5 (15 cells) stay open.
        assert_eq!(result.trail_cells, 5);
        assert_eq!(result.open_before, 20);
        assert_eq!(result.open_after, 15);
        assert_eq!(result.captured(), 10);
        for y in 1..=5 {
            assert_eq!(grid.get(Coord::new(1, y)), Cell::Claimed);
            assert_eq!(grid.get(Coord::new(2, y)), Cell::Claimed);
            assert_eq!(grid.get(Coord::new(4, y)), Cell::Open);
        }
    }

    #[test]
    fn test_other_trail_survives_and_blocks_fill() {
        let mut grid = Grid::new(7, 7).unwrap();
        for y in 1..=5 {
            grid.set(Coord::new(3, y), Cell::Trail(2));
        }
        grid.set(Coord::new(1, 1), Cell::Trail(1));
        let result = resolve_enclosure(&mut grid, 1, [Coord::new(5, 3)]);

        // Actor 2's wall cuts the board; the left side is unreachable.
        assert_eq!(grid.get(Coord::new(3, 3)), Cell::Trail(2));
        assert_eq!(grid.get(Coord::new(1, 1)), Cell::Claimed);
        assert_eq!(grid.get(Coord::new(2, 4)), Cell::Claimed);
        assert_eq!(grid.get(Coord::new(5, 3)), Cell::Open);
        assert_eq!(result.captured(), 1 + 9);
    }

    #[test]
    fn test_seed_on_non_open_cell_is_ignored() {
        let mut grid = Grid::new(5, 5).unwrap();
        let marked = mark_reachable(&mut grid, [Coord::new(0, 0), Coord::new(9, 9)]);
        assert_eq!(marked, 0);
        assert_eq!(grid.count(|c| c == Cell::Scratch), 0);
    }

    #[test]
    fn test_shared_fill_counts_each_cell_once() {
        let mut grid = Grid::new(5, 5).unwrap();
        let marked = mark_reachable(&mut grid, [Coord::new(1, 1), Coord::new(3, 3)]);
        assert_eq!(marked, 9);
    }
}
