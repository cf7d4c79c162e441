//! Demo host: owns the grid, drives render passes and feeds edits from a
//! background producer through the mutation queue.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tessera_blend::{BlendRuleTable, DrawList, PassStats, RenderPass, Resolver, ResolverConfig};
use tessera_edit::{Editor, Mutation, MutationQueue, MutationSender};
use tessera_grid::{ResolveState, Slope, TileGrid, Viewport};
use tessera_tiles::{Layer, TileFamily, TileId, TileRegistry, WallId};

use crate::worldgen::{self, WorldGenConfig, WorldGenParams};

/// Everything read from the assets directory.
pub struct Assets {
    pub registry: Arc<TileRegistry>,
    pub tiles: Arc<BlendRuleTable>,
    pub walls: Arc<BlendRuleTable>,
    pub worldgen: WorldGenParams,
}

impl Assets {
    pub fn load(dir: &Path) -> Result<Self, Box<dyn Error>> {
        let registry = TileRegistry::load_from_path(dir.join("tiles.toml"))?;
        let tiles = BlendRuleTable::load_from_path(dir.join("blend/tile_rules.toml"), Layer::Tile)?;
        let walls = BlendRuleTable::load_from_path(dir.join("blend/wall_rules.toml"), Layer::Wall)?;
        let wg_path = dir.join("worldgen.toml");
        let worldgen = if wg_path.exists() {
            worldgen::load_params_from_path(&wg_path, &registry)?
        } else {
            log::warn!("{} not found; using built-in world generation", wg_path.display());
            WorldGenParams::from_config(&WorldGenConfig::default(), &registry)?
        };
        log::info!(
            "loaded {} tile type(s) and {} wall type(s) from {}",
            registry.tiles.iter().filter(|t| t.is_registered()).count(),
            registry.wall_by_name.len(),
            dir.display()
        );
        Ok(Self {
            registry: Arc::new(registry),
            tiles: Arc::new(tiles),
            walls: Arc::new(walls),
            worldgen,
        })
    }
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub view: Viewport,
    pub scan_limit: usize,
}

#[derive(Debug, Default)]
pub struct Report {
    pub passes: Vec<PassStats>,
    pub edits_applied: usize,
    /// Settle passes needed after the last edit until every visible cell
    /// was resolved; `None` if the settle budget ran out.
    pub settled_after: Option<usize>,
    pub unresolved_visible: usize,
    pub last: DrawList,
}

pub struct Session {
    grid: TileGrid,
    resolver: Resolver,
    editor: Editor,
    queue: MutationQueue,
    view: Viewport,
    track_route: Vec<(i32, i32)>,
}

impl Session {
    /// Settle passes allowed after the last edit.
    pub const SETTLE_PASSES: usize = 3;

    pub fn new(assets: &Assets, cfg: &SessionConfig) -> Self {
        let resolver = Resolver::new(
            Arc::clone(&assets.registry),
            Arc::clone(&assets.tiles),
            Arc::clone(&assets.walls),
            ResolverConfig {
                seed: cfg.seed,
                scan_limit: cfg.scan_limit,
            },
        );
        let generated = worldgen::generate(&assets.worldgen, cfg.width, cfg.height, cfg.seed);
        let mut grid = generated.grid;
        let mut editor = Editor::new(Arc::clone(&assets.registry), cfg.scan_limit);
        let track = assets.worldgen.track;
        for &(x, y) in &generated.track_route {
            if let Err(e) = editor.apply(&mut grid, Mutation::PlaceTile { x, y, tile: track }) {
                log::warn!("track route: {e}");
            }
        }
        let view = cfg.view.clamp_to(grid.width, grid.height);
        if view != cfg.view {
            log::warn!("view {:?} clamped to {:?}", cfg.view, view);
        }
        Self {
            grid,
            resolver,
            editor,
            queue: MutationQueue::new(),
            view,
            track_route: generated.track_route,
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn registry(&self) -> &TileRegistry {
        self.resolver.registry()
    }

    pub fn view(&self) -> Viewport {
        self.view
    }

    pub fn sender(&self) -> MutationSender {
        self.queue.sender()
    }

    /// One frame: apply whatever edits have arrived, then resolve and draw.
    pub fn frame(&mut self) -> (usize, DrawList) {
        let applied = self.editor.apply_queued(&mut self.grid, &self.queue);
        let list = RenderPass::run(&self.resolver, &mut self.grid, self.view);
        (applied, list)
    }

    /// Runs `passes` frames while a producer thread submits `edits` random
    /// mutations inside the view, then settles.
    pub fn run(&mut self, passes: usize, edits: usize, seed: u64) -> Report {
        let mut report = Report::default();
        let producer = (edits > 0).then(|| {
            let tx = self.sender();
            let script = EditScript::new(self.registry(), self.view, self.track_route.clone());
            thread::spawn(move || script.submit(&tx, edits, seed))
        });

        for i in 0..passes {
            let (applied, list) = self.frame();
            report.edits_applied += applied;
            log_pass(i, applied, &list.stats);
            report.passes.push(list.stats);
            report.last = list;
        }
        if let Some(handle) = producer {
            if handle.join().is_err() {
                log::error!("edit producer panicked");
            }
        }

        // Drain the tail of the queue, then give the lazy resolver room to settle.
        report.edits_applied += self.editor.apply_queued(&mut self.grid, &self.queue);
        for i in 0..Self::SETTLE_PASSES {
            let list = RenderPass::run(&self.resolver, &mut self.grid, self.view);
            report.passes.push(list.stats);
            report.last = list;
            report.unresolved_visible = self.unresolved_visible();
            if report.unresolved_visible == 0 {
                report.settled_after = Some(i + 1);
                break;
            }
        }
        let stats = self.editor.stats();
        log::info!(
            "{} edit(s) applied ({} rejected), {} cache reset(s), {} track re-frame(s), revision {}",
            report.edits_applied,
            stats.rejected,
            stats.invalidated,
            stats.tracks_reframed,
            self.editor.revision()
        );
        report
    }

    fn unresolved_visible(&self) -> usize {
        self.view
            .cells()
            .filter(|&(x, y)| {
                self.grid
                    .get(x, y)
                    .is_some_and(|c| c.cache().state() != ResolveState::Resolved)
            })
            .count()
    }
}

fn log_pass(i: usize, applied: usize, s: &PassStats) {
    log::debug!(
        "pass {i}: {applied} edit(s); visited {} walls {} tiles {}; computed {} provisional {} validated {} cached {}",
        s.visited,
        s.walls_drawn,
        s.tiles_drawn,
        s.computed,
        s.provisional,
        s.validated,
        s.cached
    );
}

/// Random editor activity confined to the view.
struct EditScript {
    view: Viewport,
    tiles: Vec<TileId>,
    walls: Vec<WallId>,
    tracks: Vec<(i32, i32)>,
}

impl EditScript {
    fn new(reg: &TileRegistry, view: Viewport, tracks: Vec<(i32, i32)>) -> Self {
        let tiles = reg
            .tiles
            .iter()
            .filter(|t| t.is_registered() && matches!(t.family, TileFamily::Block | TileFamily::Platform))
            .map(|t| t.id)
            .collect();
        let mut walls: Vec<WallId> = reg.wall_by_name.values().copied().collect();
        walls.sort_unstable();
        let tracks = tracks.into_iter().filter(|&(x, y)| view.contains(x, y)).collect();
        Self {
            view,
            tiles,
            walls,
            tracks,
        }
    }

    fn submit(&self, tx: &MutationSender, count: usize, seed: u64) {
        let mut rng = SmallRng::seed_from_u64(seed ^ 0xED17);
        for _ in 0..count {
            let Some(m) = self.pick(&mut rng) else { return };
            if !tx.send(m) {
                return;
            }
        }
    }

    fn pick(&self, rng: &mut SmallRng) -> Option<Mutation> {
        if self.view.is_empty() {
            return None;
        }
        let x = self.view.x + rng.gen_range(0..self.view.width);
        let y = self.view.y + rng.gen_range(0..self.view.height);
        let m = match rng.gen_range(0..10) {
            0..=2 if !self.tiles.is_empty() => {
                let tile = self.tiles[rng.gen_range(0..self.tiles.len())];
                Mutation::PlaceTile { x, y, tile }
            }
            3 | 4 => Mutation::ClearTile { x, y },
            5 if !self.walls.is_empty() => {
                let wall = self.walls[rng.gen_range(0..self.walls.len())];
                Mutation::PlaceWall { x, y, wall }
            }
            6 => Mutation::ClearWall { x, y },
            7 => {
                const SLOPES: [Slope; 4] = [Slope::Full, Slope::HalfBrick, Slope::TopLeft, Slope::TopRight];
                Mutation::SetSlope {
                    x,
                    y,
                    slope: SLOPES[rng.gen_range(0..SLOPES.len())],
                }
            }
            8 if !self.tracks.is_empty() => {
                let (x, y) = self.tracks[rng.gen_range(0..self.tracks.len())];
                Mutation::HammerTrack { x, y }
            }
            _ => Mutation::PaintTile {
                x,
                y,
                paint: rng.gen_range(0..32),
            },
        };
        Some(m)
    }
}
