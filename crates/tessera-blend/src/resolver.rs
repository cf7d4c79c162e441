use std::sync::Arc;

use rand::Rng;
use tessera_grid::{Cell, Dir, Neighborhood, ResolveState, TileGrid, VariantCache};
use tessera_tiles::{Biome, Layer, TextureHandle, TileFamily, TileId, TileRegistry, TileType, WallType};

use crate::atlas::{AtlasLayout, RegistryAtlas, Visual};
use crate::families::{self, CactusRole};
use crate::predicate::{BlendPlan, MergePredicate, wall_mask};
use crate::rules::{BlendRuleTable, Strictness, Uv};
use crate::seed::{self, SALT_PLATFORM, SALT_TILE, SALT_WALL};

/// Tunables of the resolver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    /// World seed for per-cell variant rolls.
    pub seed: u64,
    /// Rows a tree or cactus column scan may walk before giving up.
    pub scan_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            scan_limit: 100,
        }
    }
}

/// What one resolution call did to the cache.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Cache was already final; nothing recomputed.
    Cached,
    /// Computed from the sentinel.
    Computed,
    /// Recomputed but some neighbor is still unresolved.
    Provisional,
    /// Recomputed and marked validated.
    Validated,
}

/// Resolves per-cell visuals against shared, immutable rule tables.
pub struct Resolver {
    registry: Arc<TileRegistry>,
    tiles: Arc<BlendRuleTable>,
    walls: Arc<BlendRuleTable>,
    atlas: Arc<dyn AtlasLayout + Send + Sync>,
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(
        registry: Arc<TileRegistry>,
        tiles: Arc<BlendRuleTable>,
        walls: Arc<BlendRuleTable>,
        config: ResolverConfig,
    ) -> Self {
        let atlas = Arc::new(RegistryAtlas::from_registry(&registry));
        Self {
            registry,
            tiles,
            walls,
            atlas,
            config,
        }
    }

    pub fn with_atlas(mut self, atlas: Arc<dyn AtlasLayout + Send + Sync>) -> Self {
        self.atlas = atlas;
        self
    }

    #[inline]
    pub fn registry(&self) -> &TileRegistry {
        &self.registry
    }

    #[inline]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    #[inline]
    pub fn tile_rules(&self) -> &BlendRuleTable {
        &self.tiles
    }

    /// Visual for one layer of `(x, y)`, filling the cache as needed.
    /// Repeated calls without intervening edits return the same value.
    pub fn resolve_visual(&self, grid: &mut TileGrid, x: i32, y: i32, layer: Layer) -> Option<Visual> {
        self.resolve_traced(grid, x, y, layer).0
    }

    pub fn resolve_traced(
        &self,
        grid: &mut TileGrid,
        x: i32,
        y: i32,
        layer: Layer,
    ) -> (Option<Visual>, Step) {
        match layer {
            Layer::Tile => self.resolve_tile(grid, x, y),
            Layer::Wall => self.resolve_wall(grid, x, y),
        }
    }

    fn resolve_wall(&self, grid: &mut TileGrid, x: i32, y: i32) -> (Option<Visual>, Step) {
        let Some(cell) = grid.get(x, y) else {
            return (None, Step::Cached);
        };
        let cached = cell.cache().wall_code();
        if cell.wall == 0 {
            if cached.is_unresolved() {
                if let Some(c) = grid.get_mut(x, y) {
                    c.cache_mut().store_wall(VariantCache::EMPTY);
                }
                return (None, Step::Computed);
            }
            return (None, Step::Cached);
        }
        let (id, paint) = (cell.wall, cell.wall_paint);
        let wall = self
            .registry
            .wall(id)
            .cloned()
            .unwrap_or_else(|| WallType::placeholder(id));
        let cut = |uv: Uv| Visual::cut(self.atlas.as_ref(), Layer::Wall, id, uv, wall.texture(), paint);
        if let Some(uv) = Uv::from_code(cached) {
            return (Some(cut(uv)), Step::Cached);
        }
        let Some(n) = grid.neighborhood(x, y) else {
            return (None, Step::Cached);
        };
        let mask = wall_mask(wall.blend, id, &n);
        let roll = seed::cell_roll(self.config.seed, x, y, SALT_WALL);
        let uv = self.walls.lookup(mask, 0, Strictness::Generic, roll);
        if let Some(c) = grid.get_mut(x, y) {
            c.cache_mut().store_wall(uv.code());
        }
        (Some(cut(uv)), Step::Computed)
    }

    fn resolve_tile(&self, grid: &mut TileGrid, x: i32, y: i32) -> (Option<Visual>, Step) {
        let Some(cell) = grid.get(x, y).copied() else {
            return (None, Step::Cached);
        };
        let state = cell.cache().state();
        if !cell.active {
            if state == ResolveState::Unresolved {
                store(grid, x, y, VariantCache::EMPTY, true, 0);
                return (None, Step::Computed);
            }
            return (None, Step::Cached);
        }

        let placeholder;
        let ty: &TileType = match self.registry.tile(cell.tile) {
            Some(t) => t,
            None => {
                placeholder = TileType::placeholder(cell.tile);
                &placeholder
            }
        };

        if state == ResolveState::Resolved {
            return (self.visual_from_cache(ty, &cell), Step::Cached);
        }

        let Some(n) = grid.neighborhood(x, y) else {
            return (None, Step::Cached);
        };
        let limit = self.config.scan_limit;
        let (uv, texture) = match ty.family {
            TileFamily::Block => match BlendPlan::for_tile(ty) {
                None => {
                    let uv = stored_frame(&cell);
                    store(grid, x, y, uv.code(), true, 0);
                    (uv, ty.texture())
                }
                Some(plan) => return self.resolve_blend(grid, x, y, ty, &cell, plan, &n),
            },
            TileFamily::Tree | TileFamily::Palm => {
                let palm = ty.family == TileFamily::Palm;
                let biome = families::tree_style(&self.registry, palm, grid.column_below(x, y, limit));
                store(grid, x, y, VariantCache::from_variant(biome as u8), true, 0);
                (stored_frame(&cell), TextureHandle::Tree { palm, biome })
            }
            TileFamily::Cactus => {
                let uv = self.cactus_uv(grid, x, y, &n);
                store(grid, x, y, uv.code(), true, 0);
                (uv, ty.texture())
            }
            TileFamily::Platform => {
                let variety = ty.variety.max(1);
                let mut rng = seed::cell_rng(self.config.seed, x, y, SALT_PLATFORM);
                let row = rng.gen_range(0..variety);
                let style = cell.frame_v.clamp(0, 255) as u16 * variety as u16 + row as u16;
                let uv = Uv::new(
                    families::platform_variant(&self.registry, &n),
                    style.min(254) as u8,
                );
                store(grid, x, y, uv.code(), true, 0);
                (uv, ty.texture())
            }
            TileFamily::Track => {
                let piece = match families::stored_piece(&n.center) {
                    Some(_) => cell.frame_u as u8,
                    None => {
                        let options = families::track_options(&self.registry, &n);
                        families::select_track_piece(&options, families::Selectors::from_frame_v(cell.frame_v))
                    }
                };
                let uv = families::piece_frame(piece);
                store(grid, x, y, uv.code(), true, 0);
                (uv, ty.texture())
            }
        };
        let visual = Visual::cut(self.atlas.as_ref(), Layer::Tile, ty.id, uv, texture, cell.tile_paint);
        (Some(visual), Step::Computed)
    }

    /// Lazy blend resolution: Unresolved -> Provisional -> Resolved.
    #[allow(clippy::too_many_arguments)]
    fn resolve_blend(
        &self,
        grid: &mut TileGrid,
        x: i32,
        y: i32,
        ty: &TileType,
        cell: &Cell,
        plan: BlendPlan,
        n: &Neighborhood,
    ) -> (Option<Visual>, Step) {
        let (same, merge) = self.blend_masks(&plan, n);
        let roll = seed::cell_roll(self.config.seed, x, y, SALT_TILE);
        let uv = self.tiles.lookup(same, merge, plan.strictness, roll);
        let step = match cell.cache().state() {
            ResolveState::Unresolved => {
                store(grid, x, y, uv.code(), false, 0);
                Step::Computed
            }
            _ => {
                let deps = same | merge;
                let settled = Dir::ALL
                    .iter()
                    .filter(|d| deps & d.bit() != 0)
                    .all(|d| n.get(*d).is_some_and(|c| c.is_resolvable()));
                if settled {
                    let validity = self.tiles.validity_mask(plan.strictness, uv);
                    store(grid, x, y, uv.code(), true, validity);
                    Step::Validated
                } else {
                    store(grid, x, y, uv.code(), false, 0);
                    Step::Provisional
                }
            }
        };
        let visual = Visual::cut(self.atlas.as_ref(), Layer::Tile, ty.id, uv, ty.texture(), cell.tile_paint);
        (Some(visual), step)
    }

    /// Connectivity masks for a blending tile. A validated cardinal neighbor
    /// that blends the same way answers through its validity bit toward this
    /// cell, set or clear; other neighbors go through the predicate.
    pub fn blend_masks(&self, plan: &BlendPlan, n: &Neighborhood) -> (u8, u8) {
        let (mut same, merge) = plan.masks(&self.registry, n);
        for d in Dir::CARDINALS {
            let Some(c) = n.get(d) else { continue };
            if !(c.active && c.lazy_validated() && self.blends_like(plan, c.tile)) {
                continue;
            }
            if c.validity & d.opposite().bit() != 0 {
                same |= d.bit();
            } else {
                same &= !d.bit();
            }
        }
        (same, merge)
    }

    fn blends_like(&self, plan: &BlendPlan, id: TileId) -> bool {
        match self.registry.tile(id) {
            Some(t) => t.family == TileFamily::Block && BlendPlan::for_tile(t).is_some_and(|p| p.same == plan.same),
            None => plan.same == MergePredicate::Identity(id),
        }
    }

    fn cactus_uv(&self, grid: &TileGrid, x: i32, y: i32, n: &Neighborhood) -> Uv {
        let limit = self.config.scan_limit;
        let scan = families::cactus_role(&self.registry, grid.column_below(x, y, limit));
        let trunk_x = match scan.role {
            CactusRole::Trunk => x,
            CactusRole::LeftBranch => x + 1,
            CactusRole::RightBranch => x - 1,
        };
        let base_y = y + scan.depth as i32;
        let budget = limit.saturating_sub(scan.depth);
        let tint = families::cactus_tint(&self.registry, grid.column_below(trunk_x, base_y, budget));
        let piece = families::cactus_piece(&self.registry, scan.role, n);
        families::cactus_uv(scan.role, piece, tint)
    }

    fn visual_from_cache(&self, ty: &TileType, cell: &Cell) -> Option<Visual> {
        let code = cell.cache().tile_code();
        let (uv, texture) = match ty.family {
            TileFamily::Tree | TileFamily::Palm => {
                let biome = Biome::from_index(code.raw());
                let palm = ty.family == TileFamily::Palm;
                (stored_frame(cell), TextureHandle::Tree { palm, biome })
            }
            _ => (Uv::from_code(code)?, ty.texture()),
        };
        Some(Visual::cut(self.atlas.as_ref(), Layer::Tile, ty.id, uv, texture, cell.tile_paint))
    }
}

#[inline]
fn store(grid: &mut TileGrid, x: i32, y: i32, code: VariantCache, validated: bool, validity: u8) {
    if let Some(c) = grid.get_mut(x, y) {
        c.cache_mut().store_tile(code, validated, validity);
    }
}

/// The cell's own frame fields as an atlas coordinate.
#[inline]
fn stored_frame(cell: &Cell) -> Uv {
    Uv::new(cell.frame_u.clamp(0, 254) as u8, cell.frame_v.clamp(0, 254) as u8)
}
