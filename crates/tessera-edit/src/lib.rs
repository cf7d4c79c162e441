//! Editor-side mutation of the tile grid and resolve-cache invalidation.
#![forbid(unsafe_code)]

mod error;
mod invalidate;
mod mutation;
mod queue;
pub mod tracks;

use std::sync::Arc;

use tessera_blend::families::track::is_track;
use tessera_grid::{Slope, TileGrid};
use tessera_tiles::types::NO_WALL;
use tessera_tiles::{TileFamily, TileRegistry};

pub use error::EditError;
pub use invalidate::{invalidate_around, invalidate_stacks_above};
pub use mutation::Mutation;
pub use queue::{MutationQueue, MutationSender};
pub use tracks::TrackEdit;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditStats {
    pub applied: u64,
    pub rejected: u64,
    pub invalidated: u64,
    pub tracks_reframed: u64,
}

/// Applies mutations to a grid and keeps its resolve caches honest.
pub struct Editor {
    registry: Arc<TileRegistry>,
    scan_limit: usize,
    revision: u64,
    stats: EditStats,
}

impl Editor {
    /// `scan_limit` should match the resolver's so every cell whose column
    /// scan can see an edit gets reset.
    pub fn new(registry: Arc<TileRegistry>, scan_limit: usize) -> Self {
        Self {
            registry,
            scan_limit,
            revision: 0,
            stats: EditStats::default(),
        }
    }

    /// Bumped on every applied mutation. Never zero after the first edit.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn stats(&self) -> EditStats {
        self.stats
    }

    pub fn apply(&mut self, grid: &mut TileGrid, m: Mutation) -> Result<u64, EditError> {
        match self.apply_inner(grid, m) {
            Ok(()) => {
                self.stats.applied += 1;
                self.revision = self.revision.wrapping_add(1).max(1);
                Ok(self.revision)
            }
            Err(e) => {
                self.stats.rejected += 1;
                Err(e)
            }
        }
    }

    /// Applies everything queued so far in submission order. Rejected
    /// mutations are logged and dropped. Returns how many were applied.
    pub fn apply_queued(&mut self, grid: &mut TileGrid, queue: &MutationQueue) -> usize {
        let batch = queue.drain();
        let mut applied = 0;
        for m in &batch {
            match self.apply(grid, *m) {
                Ok(_) => applied += 1,
                Err(e) => log::warn!("dropping {m:?}: {e}"),
            }
        }
        if !batch.is_empty() {
            log::debug!(
                "applied {applied}/{} queued edit(s), revision {}",
                batch.len(),
                self.revision
            );
        }
        applied
    }

    fn apply_inner(&mut self, grid: &mut TileGrid, m: Mutation) -> Result<(), EditError> {
        let (x, y) = m.pos();
        let reg = Arc::clone(&self.registry);
        let here = grid.view(x, y).ok_or(EditError::OutOfBounds { x, y })?;
        let on_track = is_track(&reg, &here);

        match m {
            Mutation::PlaceTile { tile, .. } if reg.family(tile) == Some(TileFamily::Track) => {
                let edit = tracks::place_track(grid, &reg, x, y, tile)?;
                self.note_tracks(&edit);
            }
            Mutation::PlaceTile { tile, .. } => {
                if on_track {
                    let edit = tracks::erase_track(grid, &reg, x, y)?;
                    self.note_tracks(&edit);
                }
                if let Some(c) = grid.get_mut(x, y) {
                    c.tile = tile;
                    c.active = true;
                    c.slope = Slope::Full;
                    c.frame_u = 0;
                    c.frame_v = 0;
                    c.tile_paint = 0;
                }
            }
            Mutation::ClearTile { .. } if on_track => {
                let edit = tracks::erase_track(grid, &reg, x, y)?;
                self.note_tracks(&edit);
            }
            Mutation::ClearTile { .. } => {
                if let Some(c) = grid.get_mut(x, y) {
                    c.active = false;
                    c.slope = Slope::Full;
                    c.frame_u = 0;
                    c.frame_v = 0;
                    c.tile_paint = 0;
                }
            }
            Mutation::HammerTrack { .. } => {
                let edit = tracks::hammer_track(grid, &reg, x, y)?;
                self.note_tracks(&edit);
            }
            Mutation::SetSlope { slope, .. } => {
                if let Some(c) = grid.get_mut(x, y) {
                    c.slope = slope;
                }
            }
            Mutation::SetFrame { u, v, .. } => {
                if let Some(c) = grid.get_mut(x, y) {
                    c.frame_u = u;
                    c.frame_v = v;
                }
            }
            Mutation::PlaceWall { wall, .. } => {
                if let Some(c) = grid.get_mut(x, y) {
                    c.wall = wall;
                    c.wall_paint = 0;
                }
            }
            Mutation::ClearWall { .. } => {
                if let Some(c) = grid.get_mut(x, y) {
                    c.wall = NO_WALL;
                    c.wall_paint = 0;
                }
            }
            Mutation::PaintTile { paint, .. } => {
                if let Some(c) = grid.get_mut(x, y) {
                    c.tile_paint = paint;
                }
            }
            Mutation::PaintWall { paint, .. } => {
                if let Some(c) = grid.get_mut(x, y) {
                    c.wall_paint = paint;
                }
            }
            Mutation::SetWires { wires, .. } => {
                if let Some(c) = grid.get_mut(x, y) {
                    c.wires = wires;
                }
            }
            Mutation::SetLiquid { liquid, .. } => {
                if let Some(c) = grid.get_mut(x, y) {
                    c.liquid = liquid;
                }
            }
        }

        if m.touches_resolution() {
            let mut n = invalidate_around(grid, x, y);
            if matches!(m, Mutation::PlaceTile { .. } | Mutation::ClearTile { .. }) {
                n += invalidate_stacks_above(grid, &reg, x, y, self.scan_limit);
            }
            self.stats.invalidated += n as u64;
        }
        Ok(())
    }

    fn note_tracks(&mut self, edit: &TrackEdit) {
        self.stats.tracks_reframed += edit.updated.len() as u64;
        self.stats.invalidated += edit.invalidated as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_grid::{Liquid, LiquidKind, VariantCache, Wires};

    fn registry() -> Arc<TileRegistry> {
        Arc::new(
            TileRegistry::from_toml_str(
                r#"
                [[tiles]]
                id = 0
                name = "dirt"

                [[tiles]]
                id = 1
                name = "tree"
                family = "tree"
                "#,
            )
            .unwrap(),
        )
    }

    fn settle(g: &mut TileGrid) {
        for c in g.cells_mut() {
            c.cache_mut().store_tile(VariantCache::EMPTY, true, 0);
            c.cache_mut().store_wall(VariantCache::EMPTY);
        }
    }

    #[test]
    fn revision_bumps_only_on_success() {
        let mut ed = Editor::new(registry(), 100);
        let mut g = TileGrid::new(4, 4);
        assert_eq!(ed.revision(), 0);
        assert_eq!(ed.apply(&mut g, Mutation::PlaceTile { x: 1, y: 1, tile: 0 }), Ok(1));
        assert_eq!(
            ed.apply(&mut g, Mutation::ClearTile { x: -1, y: 0 }),
            Err(EditError::OutOfBounds { x: -1, y: 0 })
        );
        assert_eq!(ed.revision(), 1);
        let s = ed.stats();
        assert_eq!((s.applied, s.rejected), (1, 1));
    }

    #[test]
    fn decorations_leave_caches_alone() {
        let mut ed = Editor::new(registry(), 100);
        let mut g = TileGrid::new(4, 4);
        settle(&mut g);
        let edits = [
            Mutation::PaintTile { x: 1, y: 1, paint: 3 },
            Mutation::PaintWall { x: 1, y: 1, paint: 4 },
            Mutation::SetWires { x: 1, y: 1, wires: Wires::RED.with(Wires::BLUE) },
            Mutation::SetLiquid {
                x: 1,
                y: 1,
                liquid: Liquid {
                    kind: LiquidKind::Water,
                    amount: 255,
                },
            },
        ];
        for m in edits {
            ed.apply(&mut g, m).unwrap();
        }
        assert_eq!(g.count_unresolved(), 0);
        let c = g.get(1, 1).unwrap();
        assert_eq!((c.tile_paint, c.wall_paint), (3, 4));
        assert!(c.wires.contains(Wires::BLUE));
        assert_eq!(ed.stats().invalidated, 0);
    }

    #[test]
    fn structural_edits_reset_the_neighborhood() {
        let mut ed = Editor::new(registry(), 100);
        let mut g = TileGrid::new(5, 5);
        settle(&mut g);
        ed.apply(&mut g, Mutation::SetSlope { x: 2, y: 2, slope: Slope::HalfBrick }).unwrap();
        assert_eq!(g.count_unresolved(), 9);
        assert!(g.get(4, 4).unwrap().is_resolved());
        settle(&mut g);
        ed.apply(&mut g, Mutation::PlaceWall { x: 0, y: 4, wall: 2 }).unwrap();
        assert_eq!(g.count_unresolved(), 4);
        assert_eq!(g.get(0, 4).unwrap().wall, 2);
    }

    #[test]
    fn ground_edit_resets_tree_stack_above() {
        let mut ed = Editor::new(registry(), 100);
        let mut g = TileGrid::new(3, 12);
        for y in 2..8 {
            *g.get_mut(1, y).unwrap() = tessera_grid::Cell::with_tile(1);
        }
        settle(&mut g);
        // Ground two rows below the lowest trunk cell: the gap is skipped.
        ed.apply(&mut g, Mutation::PlaceTile { x: 1, y: 9, tile: 0 }).unwrap();
        for y in 2..8 {
            assert!(!g.get(1, y).unwrap().is_resolved(), "trunk row {y} kept its cache");
        }
        assert!(g.get(1, 0).unwrap().is_resolved());
    }

    #[test]
    fn replacing_a_track_releases_its_neighbor() {
        let reg = Arc::new(
            TileRegistry::from_toml_str(
                r#"
                [[tiles]]
                id = 0
                name = "dirt"

                [[tiles]]
                id = 1
                name = "track"
                family = "track"
                "#,
            )
            .unwrap(),
        );
        let mut ed = Editor::new(reg, 100);
        let mut g = TileGrid::new(4, 3);
        ed.apply(&mut g, Mutation::PlaceTile { x: 1, y: 1, tile: 1 }).unwrap();
        ed.apply(&mut g, Mutation::PlaceTile { x: 2, y: 1, tile: 1 }).unwrap();
        assert_ne!(g.get(1, 1).unwrap().frame_u, 0);
        ed.apply(&mut g, Mutation::PlaceTile { x: 2, y: 1, tile: 0 }).unwrap();
        assert_eq!(g.get(1, 1).unwrap().frame_u, 0);
        assert_eq!(g.get(2, 1).unwrap().tile, 0);
        assert_eq!(
            ed.apply(&mut g, Mutation::HammerTrack { x: 2, y: 1 }),
            Err(EditError::NotTrack { x: 2, y: 1 })
        );
        assert!(ed.stats().tracks_reframed >= 3);
    }
}
