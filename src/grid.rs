//! Grid-space types shared by the classifier and the layout planner.

use std::collections::HashMap;

/// A cell coordinate in layout space. Row 0 is the bottom visual row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    /// Column, growing rightward.
    pub x: usize,
    /// Row, growing upward.
    pub y: usize,
}

impl GridPos {
    /// Convenience constructor.
    pub fn new(x: usize, y: usize) -> GridPos {
        GridPos { x, y }
    }
}

/// Orientation of a sloped cell's collision surface.
///
/// Positive slopes rise left to right, negative slopes fall. Bottom slopes
/// carry their solid mass under the diagonal, top slopes above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeKind {
    /// Rising, solid below the diagonal (exposed top-left corner).
    PositiveBottom,
    /// Falling, solid below the diagonal (exposed top-right corner).
    NegativeBottom,
    /// Falling, solid above the diagonal (exposed bottom-left corner).
    NegativeTop,
    /// Rising, solid above the diagonal (exposed bottom-right corner).
    PositiveTop,
}

/// Slope annotations for collision, keyed by cell.
pub type SlopeMap = HashMap<GridPos, SlopeKind>;

/// Row-major presence grid for one layout layer.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// Creates an empty grid of the given extent.
    pub fn new(width: usize, height: usize) -> OccupancyGrid {
        OccupancyGrid {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the in-bounds cell is occupied. Out-of-bounds reads false.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    /// Marks or clears a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, occupied: bool) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = occupied;
        }
    }

    /// Neighbor probe for classification: cells outside the grid resolve to
    /// `out_of_bounds` (the tile's edge-connects flag).
    pub fn probe(&self, x: i64, y: i64, out_of_bounds: bool) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            out_of_bounds
        } else {
            self.cells[y as usize * self.width + x as usize]
        }
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_resolves_out_of_bounds_to_edge_flag() {
        let mut grid = OccupancyGrid::new(2, 2);
        grid.set(0, 0, true);

        assert!(grid.probe(0, 0, false));
        assert!(!grid.probe(1, 1, true));
        assert!(grid.probe(-1, 0, true));
        assert!(!grid.probe(-1, 0, false));
        assert!(grid.probe(0, 2, true));
        assert!(!grid.probe(2, 0, false));
    }

    #[test]
    fn set_and_count() {
        let mut grid = OccupancyGrid::new(3, 2);
        grid.set(0, 0, true);
        grid.set(2, 1, true);
        grid.set(9, 9, true);
        assert_eq!(grid.occupied_count(), 2);
        assert!(grid.get(2, 1));
        grid.set(2, 1, false);
        assert!(!grid.get(2, 1));
        assert!(!grid.get(9, 9));
    }
}
