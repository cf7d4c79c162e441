use tessera_grid::{CellView, Dir, Neighborhood, Slope};
use tessera_tiles::{TileFamily, TileRegistry};

/// What sits beside a platform on one side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    None = 0,
    Platform = 1,
    Solid = 2,
}

/// `VARIANTS[left][right]`. The isolated platform is variant 5.
pub const VARIANTS: [[u8; 3]; 3] = [[5, 2, 7], [1, 0, 4], [6, 3, 8]];

pub const STAIR_UP_RIGHT: u8 = 9;
pub const STAIR_UP_LEFT: u8 = 10;

pub fn side_class(reg: &TileRegistry, view: Option<&CellView>) -> Side {
    let Some(c) = view.filter(|c| c.active) else {
        return Side::None;
    };
    if reg.family(c.tile) == Some(TileFamily::Platform) || c.slope.is_sloped() {
        Side::Platform
    } else if reg.is_solid(c.tile) {
        Side::Solid
    } else {
        Side::None
    }
}

pub fn platform_variant(reg: &TileRegistry, n: &Neighborhood) -> u8 {
    match n.center.slope {
        Slope::TopRight | Slope::BottomLeft => STAIR_UP_RIGHT,
        Slope::TopLeft | Slope::BottomRight => STAIR_UP_LEFT,
        Slope::Full | Slope::HalfBrick => {
            let left = side_class(reg, n.get(Dir::West));
            let right = side_class(reg, n.get(Dir::East));
            VARIANTS[left as usize][right as usize]
        }
    }
}
