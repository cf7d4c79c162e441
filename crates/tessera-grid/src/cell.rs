use serde::{Deserialize, Serialize};
use tessera_tiles::{TileId, WallId};

/// Brick style of a tile. Anything but `Full` counts as "has slope" for
/// platform connectivity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slope {
    #[default]
    Full,
    HalfBrick,
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

impl Slope {
    #[inline]
    pub fn is_sloped(self) -> bool {
        self != Slope::Full
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wires(pub u8);

impl Wires {
    pub const RED: Wires = Wires(1);
    pub const BLUE: Wires = Wires(1 << 1);
    pub const GREEN: Wires = Wires(1 << 2);
    pub const YELLOW: Wires = Wires(1 << 3);
    pub const ACTUATOR: Wires = Wires(1 << 4);

    #[inline]
    pub fn contains(self, other: Wires) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn with(self, other: Wires) -> Wires {
        Wires(self.0 | other.0)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiquidKind {
    #[default]
    None,
    Water,
    Lava,
    Honey,
    Shimmer,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Liquid {
    pub kind: LiquidKind,
    pub amount: u8,
}

/// Packed 16-bit variant code. `0xFFFF` is reserved for "unresolved"; every
/// other value is a UV code `(v << 8) | u` or a family-specific variant id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariantCache(u16);

impl VariantCache {
    pub const UNRESOLVED: VariantCache = VariantCache(0xFFFF);
    /// Code written for cells with nothing to draw.
    pub const EMPTY: VariantCache = VariantCache(0);

    /// Packs an atlas coordinate. `(255, 255)` collides with the sentinel and
    /// is rejected.
    #[inline]
    pub fn from_uv(u: u8, v: u8) -> Option<VariantCache> {
        let code = ((v as u16) << 8) | u as u16;
        (code != Self::UNRESOLVED.0).then_some(VariantCache(code))
    }

    /// Family-specific small variant ids (tree biome and similar).
    #[inline]
    pub fn from_variant(id: u8) -> VariantCache {
        VariantCache(id as u16)
    }

    #[inline]
    pub fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn is_unresolved(self) -> bool {
        self == Self::UNRESOLVED
    }

    #[inline]
    pub fn uv(self) -> Option<(u8, u8)> {
        if self.is_unresolved() {
            return None;
        }
        Some(((self.0 & 0xFF) as u8, (self.0 >> 8) as u8))
    }
}

impl Default for VariantCache {
    fn default() -> Self {
        Self::UNRESOLVED
    }
}

/// Lazy-resolution state of a cell's tile cache.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResolveState {
    /// Cache holds the sentinel; must be computed before use.
    Unresolved,
    /// Cache holds a UV, but some neighbor it depends on was not yet resolvable.
    Provisional,
    /// Cache holds a UV that neighbors may trust; skipped until invalidated.
    Resolved,
}

/// Resolution cache carried by every cell. Written only by the resolver;
/// the editor only ever calls the `invalidate*` methods.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResolveCache {
    tile: VariantCache,
    wall: VariantCache,
    lazy_validated: bool,
    validity: u8,
}

impl Default for ResolveCache {
    fn default() -> Self {
        Self {
            tile: VariantCache::UNRESOLVED,
            wall: VariantCache::UNRESOLVED,
            lazy_validated: false,
            validity: 0,
        }
    }
}

impl ResolveCache {
    #[inline]
    pub fn state(&self) -> ResolveState {
        if self.tile.is_unresolved() {
            ResolveState::Unresolved
        } else if self.lazy_validated {
            ResolveState::Resolved
        } else {
            ResolveState::Provisional
        }
    }

    /// True once the tile cache holds anything but the sentinel.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        !self.tile.is_unresolved()
    }

    #[inline]
    pub fn tile_code(&self) -> VariantCache {
        self.tile
    }

    #[inline]
    pub fn wall_code(&self) -> VariantCache {
        self.wall
    }

    #[inline]
    pub fn lazy_validated(&self) -> bool {
        self.lazy_validated
    }

    /// Cardinal validity bits (N, E, S, W in bits 0..4). Zero unless validated.
    #[inline]
    pub fn validity(&self) -> u8 {
        self.validity
    }

    #[inline]
    pub fn invalidate(&mut self) {
        *self = ResolveCache::default();
    }

    #[inline]
    pub fn invalidate_tile(&mut self) {
        self.tile = VariantCache::UNRESOLVED;
        self.lazy_validated = false;
        self.validity = 0;
    }

    #[inline]
    pub fn invalidate_wall(&mut self) {
        self.wall = VariantCache::UNRESOLVED;
    }

    #[inline]
    pub fn store_tile(&mut self, code: VariantCache, validated: bool, validity: u8) {
        self.tile = code;
        self.lazy_validated = validated && !code.is_unresolved();
        self.validity = if self.lazy_validated { validity & 0x0F } else { 0 };
    }

    #[inline]
    pub fn store_wall(&mut self, code: VariantCache) {
        self.wall = code;
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub tile: TileId,
    pub active: bool,
    #[serde(default)]
    pub slope: Slope,
    // Family-specific orientation/style selectors (tree segment, platform
    // style, track piece).
    #[serde(default)]
    pub frame_u: i16,
    #[serde(default)]
    pub frame_v: i16,
    #[serde(default)]
    pub tile_paint: u8,
    #[serde(default)]
    pub wall: WallId,
    #[serde(default)]
    pub wall_paint: u8,
    #[serde(default)]
    pub wires: Wires,
    #[serde(default)]
    pub liquid: Liquid,
    // Never persisted: a loaded cell always starts unresolved.
    #[serde(skip)]
    cache: ResolveCache,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        tile: 0,
        active: false,
        slope: Slope::Full,
        frame_u: 0,
        frame_v: 0,
        tile_paint: 0,
        wall: 0,
        wall_paint: 0,
        wires: Wires(0),
        liquid: Liquid {
            kind: LiquidKind::None,
            amount: 0,
        },
        cache: ResolveCache {
            tile: VariantCache::UNRESOLVED,
            wall: VariantCache::UNRESOLVED,
            lazy_validated: false,
            validity: 0,
        },
    };

    #[inline]
    pub fn with_tile(tile: TileId) -> Cell {
        Cell {
            tile,
            active: true,
            ..Cell::EMPTY
        }
    }

    #[inline]
    pub fn with_wall(wall: WallId) -> Cell {
        Cell {
            wall,
            ..Cell::EMPTY
        }
    }

    #[inline]
    pub fn cache(&self) -> &ResolveCache {
        &self.cache
    }

    #[inline]
    pub fn cache_mut(&mut self) -> &mut ResolveCache {
        &mut self.cache
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.cache.is_resolved()
    }

    #[inline]
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}
