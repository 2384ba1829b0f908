//! Grid module - cell occupancy, bounds and line clearing
//!
//! The grid is a fixed rectangle of cells centered on the origin, each cell
//! either empty or tagged with the kind of piece that filled it.
//! Uses a flat row-major vector (bottom row first) for cache locality; the
//! size is fixed at construction.
//! Coordinates: columns `x_min..x_max` left to right, rows `y_min..y_max`
//! bottom to top.

use serde::{Deserialize, Serialize};

use crate::types::{Cell, PieceKind, Pos};

/// Half-open rectangle of valid cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl Bounds {
    /// Centered bounds for a `width` x `height` board
    pub fn from_size(width: u16, height: u16) -> Self {
        let x_min = -(i32::from(width) / 2);
        let y_min = -(i32::from(height) / 2);
        Self {
            x_min,
            x_max: x_min + i32::from(width),
            y_min,
            y_max: y_min + i32::from(height),
        }
    }

    pub fn width(&self) -> usize {
        (self.x_max - self.x_min).max(0) as usize
    }

    pub fn height(&self) -> usize {
        (self.y_max - self.y_min).max(0) as usize
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= self.x_min && pos.x < self.x_max && pos.y >= self.y_min && pos.y < self.y_max
    }
}

/// The playfield
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    bounds: Bounds,
    /// Row-major, bottom row first: `(y - y_min) * width + (x - x_min)`
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty grid of the given size
    pub fn new(width: u16, height: u16) -> Self {
        let bounds = Bounds::from_size(width, height);
        Self {
            bounds,
            cells: vec![None; bounds.width() * bounds.height()],
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Flat index of `pos`, or None when out of bounds
    #[inline(always)]
    fn index(&self, pos: Pos) -> Option<usize> {
        if !self.bounds.contains(pos) {
            return None;
        }
        let col = (pos.x - self.bounds.x_min) as usize;
        let row = (pos.y - self.bounds.y_min) as usize;
        Some(row * self.bounds.width() + col)
    }

    /// Get cell at `pos`
    /// Returns None if out of bounds
    pub fn get(&self, pos: Pos) -> Option<Cell> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    /// Set cell at `pos`
    /// Returns false if out of bounds
    pub fn set(&mut self, pos: Pos, cell: Cell) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if every translated offset is in bounds and empty
    pub fn is_valid(&self, offsets: &[Pos], anchor: Pos) -> bool {
        offsets
            .iter()
            .all(|&offset| matches!(self.get(offset + anchor), Some(None)))
    }

    /// Mark every translated offset occupied with `kind`
    ///
    /// The caller must have just confirmed [`Grid::is_valid`] at this anchor.
    pub fn commit(&mut self, offsets: &[Pos], anchor: Pos, kind: PieceKind) {
        debug_assert!(self.is_valid(offsets, anchor));
        for &offset in offsets {
            self.set(offset + anchor, Some(kind));
        }
    }

    /// Clear every translated offset
    pub fn uncommit(&mut self, offsets: &[Pos], anchor: Pos) {
        for &offset in offsets {
            self.set(offset + anchor, None);
        }
    }

    fn row_range(&self, y: i32) -> Option<std::ops::Range<usize>> {
        if y < self.bounds.y_min || y >= self.bounds.y_max {
            return None;
        }
        let width = self.bounds.width();
        let start = (y - self.bounds.y_min) as usize * width;
        Some(start..start + width)
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: i32) -> bool {
        match self.row_range(y) {
            Some(range) => self.cells[range].iter().all(|cell| cell.is_some()),
            None => false,
        }
    }

    /// Remove row `y` and shift every row above it down by one
    fn remove_row(&mut self, y: i32) {
        let Some(range) = self.row_range(y) else {
            return;
        };
        let width = self.bounds.width();
        let total = self.cells.len();

        // copy_within handles the overlapping ranges
        self.cells.copy_within(range.end..total, range.start);
        for cell in &mut self.cells[total - width..] {
            *cell = None;
        }
    }

    /// Remove every full row, compacting the rest downward
    ///
    /// Scans from the bottom row up. After a removal the same row index is
    /// checked again, since the row shifted into it may be full as well.
    /// Returns the number of rows removed.
    pub fn clear_full_lines(&mut self) -> usize {
        let mut cleared = 0;
        let mut row = self.bounds.y_min;

        while row < self.bounds.y_max {
            if self.is_row_full(row) {
                self.remove_row(row);
                cleared += 1;
            } else {
                row += 1;
            }
        }

        cleared
    }

    /// Occupied cells with their tags, bottom row first
    pub fn occupied(&self) -> impl Iterator<Item = (Pos, PieceKind)> + '_ {
        let bounds = self.bounds;
        let width = bounds.width().max(1);
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            let kind = (*cell)?;
            let x = bounds.x_min + (idx % width) as i32;
            let y = bounds.y_min + (idx / width) as i32;
            Some((Pos::new(x, y), kind))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Clear the entire grid
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }

    /// Get a reference to the internal cells, bottom row first
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Render the grid top row first, `.` for empty cells and the kind glyph otherwise
    pub fn to_text(&self) -> String {
        let width = self.bounds.width();
        let mut out = String::with_capacity((width + 1) * self.bounds.height());
        for y in (self.bounds.y_min..self.bounds.y_max).rev() {
            for x in self.bounds.x_min..self.bounds.x_max {
                out.push(match self.get(Pos::new(x, y)).flatten() {
                    Some(kind) => kind.glyph(),
                    None => '.',
                });
            }
            out.push('\n');
        }
        out
    }
}
