//! Playfield cells and the bordered grid that holds them.

use crate::game::ActorId;

/// A cell position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Get adjacent coordinates (up, down, left, right).
    ///
    /// Returns a fixed-size array and count to avoid heap allocation.
    /// The array contains valid coordinates in indices 0..count.
    #[must_use]
    #[inline]
    pub fn adjacent(&self, width: u16, height: u16) -> ([Coord; 4], u8) {
        let mut result = [Coord::new(0, 0); 4];
        let mut count = 0u8;

        if self.y > 0 {
            result[count as usize] = Coord::new(self.x, self.y - 1); // up
            count += 1;
        }
        if self.y + 1 < height {
            result[count as usize] = Coord::new(self.x, self.y + 1); // down
            count += 1;
        }
        if self.x > 0 {
            result[count as usize] = Coord::new(self.x - 1, self.y); // left
            count += 1;
        }
        if self.x + 1 < width {
            result[count as usize] = Coord::new(self.x + 1, self.y); // right
            count += 1;
        }

        (result, count)
    }

    /// Offset by `(dx, dy)` and clamp into `[0, width-1] x [0, height-1]`.
    #[must_use]
    // Clamped into [0, len - 1], which came from a u16.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn offset_clamped(self, dx: i32, dy: i32, width: u16, height: u16) -> Self {
        let clamp = |v: u16, d: i32, len: u16| -> u16 {
            let max = i32::from(len.saturating_sub(1));
            (i32::from(v) + d).clamp(0, max) as u16
        };
        Self::new(clamp(self.x, dx, width), clamp(self.y, dy, height))
    }
}

/// State of a single playfield cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    /// Capturable empty sea.
    #[default]
    Open,
    /// Permanently safe territory, including the border.
    Claimed,
    /// In-progress trail left by the given actor.
    Trail(ActorId),
    /// Reached by the enemy flood-fill. Only exists during an enclosure pass.
    Scratch,
}

impl Cell {
    /// Check if this cell is safe ground.
    #[must_use]
    pub const fn is_claimed(self) -> bool {
        matches!(self, Cell::Claimed)
    }

    /// Check if this cell is a trail belonging to `actor`.
    #[must_use]
    pub const fn is_trail_of(self, actor: ActorId) -> bool {
        matches!(self, Cell::Trail(owner) if owner == actor)
    }

    /// Persistent byte code: 0 open, 1 claimed, `1 + id` for a trail.
    ///
    /// # Panics
    ///
    /// Panics on `Scratch`, which never outlives an enclosure pass.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Cell::Open => 0,
            Cell::Claimed => 1,
            Cell::Trail(owner) => owner.saturating_add(1),
            Cell::Scratch => panic!("scratch cell escaped an enclosure pass"),
        }
    }

    /// Inverse of [`Cell::code`].
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Cell::Open),
            1 => Some(Cell::Claimed),
            2..=0xFE => Some(Cell::Trail(code - 1)),
            _ => None,
        }
    }
}

/// The bordered playfield.
///
/// The outermost ring is always [`Cell::Claimed`]. Access is bounds-checked and an
/// out-of-range coordinate is a programming error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Number of columns (N).
    width: u16,
    /// Number of rows (M).
    height: u16,
    /// Cells stored in row-major order.
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid with a claimed border and an open interior.
    ///
    /// Returns `None` if either dimension is zero.
    #[must_use]
    pub fn new(height: u16, width: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let size = usize::from(width) * usize::from(height);
        let mut grid = Self {
            width,
            height,
            cells: vec![Cell::Open; size],
        };
        for idx in 0..size {
            if grid.is_border(grid.index_to_coord(idx)) {
                grid.cells[idx] = Cell::Claimed;
            }
        }
        Some(grid)
    }

    /// Rebuild a grid from raw row-major cells.
    ///
    /// Returns `None` when the cell count does not match the dimensions.
    #[must_use]
    pub fn from_cells(height: u16, width: u16, cells: Vec<Cell>) -> Option<Self> {
        if width == 0 || height == 0 || cells.len() != usize::from(width) * usize::from(height) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Raw cells in row-major order.
    #[must_use]
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Check if a coordinate is within the grid.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Check if a coordinate lies on the outermost ring.
    #[must_use]
    pub const fn is_border(&self, coord: Coord) -> bool {
        coord.x == 0 || coord.y == 0 || coord.x + 1 == self.width || coord.y + 1 == self.height
    }

    fn index(&self, coord: Coord) -> usize {
        assert!(
            self.in_bounds(coord),
            "cell ({}, {}) outside {}x{} grid",
            coord.x,
            coord.y,
            self.width,
            self.height
        );
        usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x)
    }

    // idx < width * height, so both parts fit in u16.
    #[allow(clippy::cast_possible_truncation)]
    fn index_to_coord(&self, idx: usize) -> Coord {
        Coord::new(
            (idx % usize::from(self.width)) as u16,
            (idx / usize::from(self.width)) as u16,
        )
    }

    /// Get the cell at `coord`.
    ///
    /// # Panics
    ///
    /// Panics if `coord` is outside the grid.
    #[must_use]
    #[inline]
    pub fn get(&self, coord: Coord) -> Cell {
        self.cells[self.index(coord)]
    }

    /// Get the cell at `coord`, or `None` outside the grid.
    #[must_use]
    pub fn try_get(&self, coord: Coord) -> Option<Cell> {
        self.in_bounds(coord).then(|| self.get(coord))
    }

    /// Set the cell at `coord`.
    ///
    /// # Panics
    ///
    /// Panics if `coord` is outside the grid or if a border cell would stop being claimed.
    pub fn set(&mut self, coord: Coord, cell: Cell) {
        let idx = self.index(coord);
        assert!(
            cell.is_claimed() || !self.is_border(coord),
            "border cell ({}, {}) must stay claimed",
            coord.x,
            coord.y
        );
        self.cells[idx] = cell;
    }

    /// Iterate over all coordinates and cells.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| (self.index_to_coord(idx), *cell))
    }

    /// Rewrite every cell in place. The closure sees each coordinate once.
    pub(crate) fn update_all(&mut self, mut f: impl FnMut(Coord, Cell) -> Cell) {
        for idx in 0..self.cells.len() {
            let coord = self.index_to_coord(idx);
            let next = f(coord, self.cells[idx]);
            debug_assert!(next.is_claimed() || !self.is_border(coord));
            self.cells[idx] = next;
        }
    }

    /// Count cells matching a predicate.
    #[must_use]
    // Grids hold at most u16::MAX^2 cells.
    #[allow(clippy::cast_possible_truncation)]
    pub fn count(&self, pred: impl Fn(Cell) -> bool) -> u32 {
        self.cells.iter().filter(|c| pred(**c)).count() as u32
    }

    /// Count open cells.
    #[must_use]
    pub fn count_open(&self) -> u32 {
        self.count(|c| c == Cell::Open)
    }

    /// Count trail cells belonging to `actor`.
    #[must_use]
    pub fn count_trail(&self, actor: ActorId) -> u32 {
        self.count(|c| c.is_trail_of(actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_adjacent() {
        let coord = Coord::new(5, 5);
        let (adj, count) = coord.adjacent(10, 10);
        let adj_slice = &adj[..count as usize];
        assert_eq!(count, 4);
        assert!(adj_slice.contains(&Coord::new(5, 4))); // up
        assert!(adj_slice.contains(&Coord::new(5, 6))); // down
        assert!(adj_slice.contains(&Coord::new(4, 5))); // left
        assert!(adj_slice.contains(&Coord::new(6, 5))); // right
    }

    #[test]
    fn test_coord_adjacent_corner() {
        let (adj, count) = Coord::new(0, 0).adjacent(10, 10);
        let adj_slice = &adj[..count as usize];
        assert_eq!(count, 2);
        assert!(adj_slice.contains(&Coord::new(0, 1)));
        assert!(adj_slice.contains(&Coord::new(1, 0)));
    }

    #[test]
    fn test_offset_clamped() {
        assert_eq!(Coord::new(0, 0).offset_clamped(-1, -1, 5, 5), Coord::new(0, 0));
        assert_eq!(Coord::new(4, 4).offset_clamped(1, 1, 5, 5), Coord::new(4, 4));
        assert_eq!(Coord::new(2, 2).offset_clamped(1, 0, 5, 5), Coord::new(3, 2));
    }

    #[test]
    fn test_grid_initial_layout() {
        let grid = Grid::new(5, 7).unwrap();
        assert_eq!(grid.height(), 5);
        assert_eq!(grid.width(), 7);
        for (coord, cell) in grid.iter() {
            if grid.is_border(coord) {
                assert_eq!(cell, Cell::Claimed);
            } else {
                assert_eq!(cell, Cell::Open);
            }
        }
        assert_eq!(grid.count_open(), 3 * 5);
    }

    #[test]
    fn test_grid_zero_size() {
        assert!(Grid::new(0, 10).is_none());
        assert!(Grid::new(10, 0).is_none());
    }

    #[test]
    fn test_grid_get_set() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set(Coord::new(2, 2), Cell::Trail(1));
        assert_eq!(grid.get(Coord::new(2, 2)), Cell::Trail(1));
        assert_eq!(grid.count_trail(1), 1);
        assert_eq!(grid.count_trail(2), 0);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_grid_out_of_bounds_is_fatal() {
        let grid = Grid::new(5, 5).unwrap();
        let _ = grid.get(Coord::new(5, 0));
    }

    #[test]
    #[should_panic(expected = "must stay claimed")]
    fn test_grid_border_write_is_fatal() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set(Coord::new(0, 2), Cell::Open);
    }

    #[test]
    fn test_try_get() {
        let grid = Grid::new(5, 5).unwrap();
        assert_eq!(grid.try_get(Coord::new(1, 1)), Some(Cell::Open));
        assert_eq!(grid.try_get(Coord::new(9, 1)), None);
    }

    #[test]
    fn test_cell_codes() {
        assert_eq!(Cell::Open.code(), 0);
        assert_eq!(Cell::Claimed.code(), 1);
        assert_eq!(Cell::Trail(1).code(), 2);
        assert_eq!(Cell::Trail(2).code(), 3);
        assert_eq!(Cell::from_code(3), Some(Cell::Trail(2)));
        assert_eq!(Cell::from_code(0xFF), None);
    }
}
