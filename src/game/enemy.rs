//! Enemy motion.
//!
//! Enemies live in pixel space and bounce off claimed ground and the playfield edge,
//! one axis at a time.

use crate::game::{Cell, Coord, Grid};

/// Per-axis speeds an enemy may spawn with. Zero is excluded.
const SPAWN_SPEEDS: [i32; 7] = [-3, -2, -1, 1, 2, 3, 4];

/// Deterministic PRNG using xorshift64.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        // Ensure non-zero state
        let state = if seed == 0 { 0x5555_5555_5555_5555 } else { seed };
        Self { state }
    }

    /// Generate next random u64.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate random u32 in [0, max).
    // The modulo keeps the value below `max`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn next_u32(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        (self.next_u64() % u64::from(max)) as u32
    }

    #[allow(clippy::cast_possible_truncation)]
    fn spawn_speed(&mut self) -> i32 {
        SPAWN_SPEEDS[self.next_u32(SPAWN_SPEEDS.len() as u32) as usize]
    }
}

/// A roaming enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enemy {
    /// Pixel x position.
    pub x: i32,
    /// Pixel y position.
    pub y: i32,
    /// Pixels moved along x per tick.
    pub dx: i32,
    /// Pixels moved along y per tick.
    pub dy: i32,
}

impl Enemy {
    /// Create an enemy with an explicit velocity.
    #[must_use]
    pub const fn new(x: i32, y: i32, dx: i32, dy: i32) -> Self {
        Self { x, y, dx, dy }
    }

    /// Spawn at `(x, y)` with a small random velocity, nonzero on both axes.
    #[must_use]
    pub fn spawn(x: i32, y: i32, rng: &mut Rng) -> Self {
        let dx = rng.spawn_speed();
        let dy = rng.spawn_speed();
        Self { x, y, dx, dy }
    }

    /// The cell this enemy occupies.
    #[must_use]
    pub fn cell(&self, tile_size: u16) -> Coord {
        let ts = i32::from(tile_size.max(1));
        let to_u16 = |v: i32| u16::try_from((v / ts).max(0)).unwrap_or(u16::MAX);
        Coord::new(to_u16(self.x), to_u16(self.y))
    }

    /// Move one tick, reversing an axis when its step would leave the board or hit
    /// claimed ground.
    pub fn advance(&mut self, grid: &Grid, tile_size: u16) {
        self.x += self.dx;
        if blocked(grid, self.x, self.y, tile_size) {
            self.dx = -self.dx;
            self.x += self.dx;
        }

        self.y += self.dy;
        if blocked(grid, self.x, self.y, tile_size) {
            self.dy = -self.dy;
            self.y += self.dy;
        }

        let ts = i32::from(tile_size);
        self.x = self.x.clamp(0, i32::from(grid.width()) * ts - 1);
        self.y = self.y.clamp(0, i32::from(grid.height()) * ts - 1);
    }
}

/// Pixel length of `cells` tiles, if positions up to one tile past it fit in `i32`.
///
/// Enemy motion overshoots the board by at most one tile before bouncing back.
#[must_use]
pub fn pixel_extent(cells: u16, tile_size: u16) -> Option<i32> {
    let ts = i32::from(tile_size);
    (i32::from(cells) + 1).checked_mul(ts)?;
    Some(i32::from(cells) * ts)
}

fn blocked(grid: &Grid, x: i32, y: i32, tile_size: u16) -> bool {
    if x < 0 || y < 0 {
        return true;
    }
    let ts = i32::from(tile_size.max(1));
    let (Ok(cx), Ok(cy)) = (u16::try_from(x / ts), u16::try_from(y / ts)) else {
        return true;
    };
    grid.try_get(Coord::new(cx, cy))
        .is_none_or(Cell::is_claimed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_spawn_velocity_nonzero() {
        let mut rng = Rng::new(42);
        for _ in 0..1000 {
            let enemy = Enemy::spawn(100, 100, &mut rng);
            assert_ne!(enemy.dx, 0);
            assert_ne!(enemy.dy, 0);
            assert!((-3..=4).contains(&enemy.dx));
            assert!((-3..=4).contains(&enemy.dy));
        }
    }

    #[test]
    fn test_cell_from_pixels() {
        let enemy = Enemy::new(37, 18, 1, 1);
        assert_eq!(enemy.cell(18), Coord::new(2, 1));
    }

    #[test]
    fn test_free_motion() {
        let grid = Grid::new(10, 10).unwrap();
        let mut enemy = Enemy::new(90, 90, 3, -2);
        enemy.advance(&grid, 18);
        assert_eq!((enemy.x, enemy.y), (93, 88));
        assert_eq!((enemy.dx, enemy.dy), (3, -2));
    }

    #[test]
    fn test_bounce_off_claimed_wall() {
        let grid = Grid::new(10, 10).unwrap();
        // Cell x=1 starts at pixel 18; one step left would enter the border.
        let mut enemy = Enemy::new(19, 90, -2, 1);
        enemy.advance(&grid, 18);
        assert_eq!(enemy.dx, 2);
        assert_eq!(enemy.x, 19);
        assert_eq!(enemy.y, 91);
    }

    #[test]
    fn test_axes_bounce_independently() {
        let mut grid = Grid::new(10, 10).unwrap();
        grid.set(Coord::new(5, 4), Cell::Claimed);
        // Moving up into (5, 4) bounces y but x keeps going.
        let mut enemy = Enemy::new(5 * 18 + 5, 5 * 18, 1, -3);
        enemy.advance(&grid, 18);
        assert_eq!(enemy.dx, 1);
        assert_eq!(enemy.dy, 3);
        assert_eq!(enemy.x, 5 * 18 + 6);
        assert_eq!(enemy.y, 5 * 18);
    }

    #[test]
    fn test_never_enters_claimed_ground() {
        let grid = Grid::new(8, 12).unwrap();
        let mut rng = Rng::new(3);
        let mut enemy = Enemy::spawn(6 * 18, 4 * 18, &mut rng);
        for _ in 0..5000 {
            enemy.advance(&grid, 18);
            assert_eq!(grid.get(enemy.cell(18)), Cell::Open);
        }
    }

    #[test]
    fn test_pixel_extent_bounds() {
        assert_eq!(pixel_extent(40, 18), Some(720));
        assert_eq!(pixel_extent(u16::MAX, 1000), Some(65_535_000));
        assert_eq!(pixel_extent(40000, 60000), None);
    }
}
