use tessera_grid::{TileGrid, Viewport};
use tessera_tiles::Layer;

use crate::atlas::Visual;
use crate::resolver::{Resolver, Step};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DrawItem {
    pub x: i32,
    pub y: i32,
    pub layer: Layer,
    pub visual: Visual,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    pub visited: usize,
    pub walls_drawn: usize,
    pub tiles_drawn: usize,
    pub computed: usize,
    pub provisional: usize,
    pub validated: usize,
    pub cached: usize,
}

impl PassStats {
    fn count(&mut self, step: Step) {
        match step {
            Step::Cached => self.cached += 1,
            Step::Computed => self.computed += 1,
            Step::Provisional => self.provisional += 1,
            Step::Validated => self.validated += 1,
        }
    }
}

/// Draw items for one frame, walls first.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    pub items: Vec<DrawItem>,
    pub stats: PassStats,
}

/// Resolves a viewport plus a one-cell margin so edge cells see settled
/// neighbors; only cells inside the viewport are drawn.
pub struct RenderPass;

impl RenderPass {
    pub const MARGIN: i32 = 1;

    pub fn run(resolver: &Resolver, grid: &mut TileGrid, viewport: Viewport) -> DrawList {
        let region = viewport.expand(Self::MARGIN).clamp_to(grid.width, grid.height);
        let mut stats = PassStats::default();
        let mut walls = Vec::new();
        let mut tiles = Vec::new();
        for (x, y) in region.cells() {
            stats.visited += 1;
            let visible = viewport.contains(x, y);
            let (wall, ws) = resolver.resolve_traced(grid, x, y, Layer::Wall);
            stats.count(ws);
            let (tile, ts) = resolver.resolve_traced(grid, x, y, Layer::Tile);
            stats.count(ts);
            if !visible {
                continue;
            }
            if let Some(visual) = wall {
                walls.push(DrawItem {
                    x,
                    y,
                    layer: Layer::Wall,
                    visual,
                });
            }
            if let Some(visual) = tile {
                tiles.push(DrawItem {
                    x,
                    y,
                    layer: Layer::Tile,
                    visual,
                });
            }
        }
        stats.walls_drawn = walls.len();
        stats.tiles_drawn = tiles.len();
        walls.append(&mut tiles);
        log::debug!(
            "pass {:?}: visited={} walls={} tiles={} computed={} provisional={} validated={}",
            viewport,
            stats.visited,
            stats.walls_drawn,
            stats.tiles_drawn,
            stats.computed,
            stats.provisional,
            stats.validated
        );
        DrawList { items: walls, stats }
    }
}
