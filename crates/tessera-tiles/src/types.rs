use serde::{Deserialize, Serialize};

pub type TileId = u16;
pub type WallId = u16;

/// Wall id that means "no wall".
pub const NO_WALL: WallId = 0;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct GroupId(pub u16);

/// Biome a ground tile belongs to. Drives tree styles and cactus tints.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Biome {
    #[default]
    Normal = 0,
    Corruption = 1,
    Jungle = 2,
    Hallowed = 3,
    Snow = 4,
    Crimson = 5,
    Mushroom = 6,
}

impl Biome {
    pub const ALL: [Biome; 7] = [
        Biome::Normal,
        Biome::Corruption,
        Biome::Jungle,
        Biome::Hallowed,
        Biome::Snow,
        Biome::Crimson,
        Biome::Mushroom,
    ];

    #[inline]
    pub fn index(self) -> u16 {
        self as u16
    }

    /// Inverse of `index`. Out-of-range values fall back to `Normal`.
    #[inline]
    pub fn from_index(i: u16) -> Biome {
        Biome::ALL.get(i as usize).copied().unwrap_or(Biome::Normal)
    }
}

/// Which of the two cached layers of a cell is being resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Tile,
    Wall,
}

/// Opaque handle for the atlas page a visual is cut from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureHandle {
    Tile(TileId),
    Wall(WallId),
    Tree { palm: bool, biome: Biome },
}

/// Size of one atlas frame in pixels, excluding padding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameSize {
    pub width: u16,
    pub height: u16,
}

impl FrameSize {
    pub const TILE: FrameSize = FrameSize {
        width: 16,
        height: 16,
    };
    pub const WALL: FrameSize = FrameSize {
        width: 32,
        height: 32,
    };

    #[inline]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}
