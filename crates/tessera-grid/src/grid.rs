use crate::cell::Cell;
use crate::dir::Dir;
use crate::neighborhood::{CellView, ColumnScan, Neighborhood};

/// Dense row-major cell storage. Coordinates are signed so callers can query
/// one cell past any edge and get `None` back.
#[derive(Clone, Debug)]
pub struct TileGrid {
    pub width: usize,
    pub height: usize,
    cells: Vec<Cell>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; width * height],
        }
    }

    /// Builds a grid from row-major cells. Returns `None` on a size mismatch.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Option<Self> {
        if cells.len() != width * height {
            return None;
        }
        let mut grid = Self {
            width,
            height,
            cells,
        };
        grid.invalidate_all();
        Some(grid)
    }

    #[inline]
    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.idx(x, y).is_some()
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.idx(x, y).map(|i| &self.cells[i])
    }

    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        self.idx(x, y).map(move |i| &mut self.cells[i])
    }

    #[inline]
    pub fn view(&self, x: i32, y: i32) -> Option<CellView> {
        self.get(x, y).map(CellView::from)
    }

    /// Snapshot of `(x, y)` and its eight neighbors.
    pub fn neighborhood(&self, x: i32, y: i32) -> Option<Neighborhood> {
        let center = self.view(x, y)?;
        Some(Neighborhood::from_fn(center, |d: Dir| {
            let (dx, dy) = d.offset();
            self.view(x + dx, y + dy)
        }))
    }

    /// Downward scan starting at `(x, y)` itself, at most `limit` rows.
    pub fn column_below(&self, x: i32, y: i32, limit: usize) -> ColumnScan<'_> {
        ColumnScan::new(self, x, y, limit)
    }

    /// Changes dimensions, keeping overlapping cells. Every cache is reset.
    pub fn resize(&mut self, width: usize, height: usize) {
        let mut cells = vec![Cell::EMPTY; width * height];
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                cells[y * width + x] = self.cells[y * self.width + x];
            }
        }
        self.width = width;
        self.height = height;
        self.cells = cells;
        self.invalidate_all();
    }

    pub fn invalidate_all(&mut self) {
        for c in &mut self.cells {
            c.invalidate();
        }
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Mutable rows, for filling the grid in parallel.
    pub fn rows_mut(&mut self) -> std::slice::ChunksMut<'_, Cell> {
        self.cells.chunks_mut(self.width.max(1))
    }

    pub fn count_unresolved(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_resolved()).count()
    }
}
