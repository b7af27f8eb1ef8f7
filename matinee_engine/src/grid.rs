//! Tile grid over the viewport and the impassable-cell index.
//!
//! World coordinates are pixels; cells are addressed by (row, col) with row 0
//! at the top. Any pixel outside the grid counts as blocked, which keeps the
//! actor inside the viewport without a separate bounds check.

use std::collections::HashSet;

use matinee_formats::CellDoc;
use serde::Serialize;

/// Fixed cell edge length in pixels. An 800x600 viewport yields a 16x12 grid.
pub const CELL_SIZE: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub fn new(row: i32, col: i32) -> Self {
        Cell { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub rows: i32,
    pub cols: i32,
    pub cell_size: f32,
}

impl Grid {
    /// Grid dimensions are floor(viewport / cell edge), recomputed on every
    /// static scene load.
    pub fn for_viewport(width: u32, height: u32) -> Self {
        Grid {
            rows: (height as f32 / CELL_SIZE).floor() as i32,
            cols: (width as f32 / CELL_SIZE).floor() as i32,
            cell_size: CELL_SIZE,
        }
    }

    /// The cell containing a pixel, unconstrained by grid bounds. Negative
    /// coordinates floor toward negative rows/cols.
    pub fn cell_containing(&self, x: f32, y: f32) -> Cell {
        Cell {
            row: (y / self.cell_size).floor() as i32,
            col: (x / self.cell_size).floor() as i32,
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row >= 0 && cell.row < self.rows && cell.col >= 0 && cell.col < self.cols
    }

    /// In-bounds cell lookup for the debug probe; `None` outside the grid.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<Cell> {
        let cell = self.cell_containing(x, y);
        self.contains(cell).then_some(cell)
    }
}

/// Impassable cells for the current static scene. Immutable once built.
#[derive(Debug, Clone)]
pub struct CollisionMap {
    grid: Grid,
    blocked: HashSet<Cell>,
}

impl CollisionMap {
    pub fn new(grid: Grid, cells: &[CellDoc]) -> Self {
        let blocked = cells
            .iter()
            .map(|cell| Cell::new(cell.row, cell.col))
            .collect();
        CollisionMap { grid, blocked }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }

    /// A pixel collides when its cell is outside the grid or marked blocked.
    pub fn is_blocked(&self, x: f32, y: f32) -> bool {
        let cell = self.grid.cell_containing(x, y);
        !self.grid.contains(cell) || self.blocked.contains(&cell)
    }
}
