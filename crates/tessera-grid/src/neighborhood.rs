use tessera_tiles::{TileId, WallId};

use crate::cell::{Cell, ResolveState, Slope};
use crate::dir::Dir;
use crate::grid::TileGrid;

/// Read-only copy of the fields resolution looks at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellView {
    pub tile: TileId,
    pub active: bool,
    pub slope: Slope,
    pub frame_u: i16,
    pub frame_v: i16,
    pub wall: WallId,
    pub state: ResolveState,
    pub validity: u8,
}

impl CellView {
    /// Whether the cell's tile cache holds anything but the sentinel.
    #[inline]
    pub fn is_resolvable(&self) -> bool {
        self.state != ResolveState::Unresolved
    }

    #[inline]
    pub fn lazy_validated(&self) -> bool {
        self.state == ResolveState::Resolved
    }

    #[inline]
    pub fn active_tile(&self) -> Option<TileId> {
        self.active.then_some(self.tile)
    }
}

impl From<&Cell> for CellView {
    #[inline]
    fn from(c: &Cell) -> Self {
        CellView {
            tile: c.tile,
            active: c.active,
            slope: c.slope,
            frame_u: c.frame_u,
            frame_v: c.frame_v,
            wall: c.wall,
            state: c.cache().state(),
            validity: c.cache().validity(),
        }
    }
}

/// Snapshot of a cell and its eight neighbors. Out-of-bounds neighbors are `None`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Neighborhood {
    pub center: CellView,
    around: [Option<CellView>; 8],
}

impl Neighborhood {
    pub fn new(center: CellView, around: [Option<CellView>; 8]) -> Self {
        Self { center, around }
    }

    pub fn from_fn(center: CellView, mut f: impl FnMut(Dir) -> Option<CellView>) -> Self {
        let mut around = [None; 8];
        for d in Dir::ALL {
            around[d.index()] = f(d);
        }
        Self { center, around }
    }

    #[inline]
    pub fn get(&self, d: Dir) -> Option<&CellView> {
        self.around[d.index()].as_ref()
    }

    /// Neighbor in `d` if it is an active tile.
    #[inline]
    pub fn active(&self, d: Dir) -> Option<&CellView> {
        self.get(d).filter(|c| c.active)
    }
}

/// One row of a downward column scan: the scanned cell plus its horizontal
/// neighbors (absent at the grid's left/right edge).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColumnSample {
    pub here: CellView,
    pub west: Option<CellView>,
    pub east: Option<CellView>,
}

/// Bounded downward scan over a three-cell-wide strip. Ends at the grid's
/// bottom edge or after `limit` rows, whichever comes first.
pub struct ColumnScan<'a> {
    grid: &'a TileGrid,
    x: i32,
    y: i32,
    remaining: usize,
}

impl<'a> ColumnScan<'a> {
    pub(crate) fn new(grid: &'a TileGrid, x: i32, y: i32, limit: usize) -> Self {
        Self {
            grid,
            x,
            y,
            remaining: limit,
        }
    }
}

impl Iterator for ColumnScan<'_> {
    type Item = ColumnSample;

    fn next(&mut self) -> Option<ColumnSample> {
        if self.remaining == 0 {
            return None;
        }
        let here = self.grid.view(self.x, self.y)?;
        let sample = ColumnSample {
            here,
            west: self.grid.view(self.x - 1, self.y),
            east: self.grid.view(self.x + 1, self.y),
        };
        self.y += 1;
        self.remaining -= 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
