use tessera_grid::{CellView, ColumnSample, Dir, Neighborhood};
use tessera_tiles::{Biome, TileFamily, TileRegistry};

use crate::rules::Uv;

/// Which part of a cactus plant a column belongs to. The value is the
/// atlas row of the untinted pieces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CactusRole {
    Trunk = 0,
    LeftBranch = 1,
    RightBranch = 2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TrunkPiece {
    Top = 0,
    Middle = 1,
    MiddleLeftArm = 2,
    MiddleRightArm = 3,
    BothArms = 4,
    Base = 5,
    Stump = 6,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BranchPiece {
    Elbow = 0,
    ElbowStub = 1,
    Stem = 2,
    Tip = 3,
}

/// Result of walking down a cactus column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CactusScan {
    pub role: CactusRole,
    /// Rows walked to reach the lowest cactus cell of the column.
    pub depth: usize,
}

#[inline]
fn is_cactus(reg: &TileRegistry, c: Option<&CellView>) -> bool {
    c.is_some_and(|c| c.active && reg.family(c.tile) == Some(TileFamily::Cactus))
}

/// Walks down through cactus cells to the lowest one. Ground under it makes
/// the column a trunk; air under it with a cactus beside marks a branch. A
/// walk cut short by the grid edge or the limit classifies as a trunk.
pub fn cactus_role(reg: &TileRegistry, column: impl IntoIterator<Item = ColumnSample>) -> CactusScan {
    let mut lowest: Option<ColumnSample> = None;
    let mut depth = 0;
    // Whether the first non-cactus cell under the column is active.
    let mut below: Option<bool> = None;
    for (i, sample) in column.into_iter().enumerate() {
        if is_cactus(reg, Some(&sample.here)) {
            lowest = Some(sample);
            depth = i;
            continue;
        }
        below = Some(sample.here.active);
        break;
    }
    let role = match (lowest, below) {
        (Some(s), Some(false)) if is_cactus(reg, s.east.as_ref()) => CactusRole::LeftBranch,
        (Some(s), Some(false)) if is_cactus(reg, s.west.as_ref()) => CactusRole::RightBranch,
        _ => CactusRole::Trunk,
    };
    CactusScan { role, depth }
}

/// Tint index: the first active non-cactus tile under the trunk decides.
pub fn cactus_tint(reg: &TileRegistry, trunk_column: impl IntoIterator<Item = ColumnSample>) -> u8 {
    let ground = trunk_column
        .into_iter()
        .map(|s| s.here)
        .find(|c| c.active && !is_cactus(reg, Some(c)));
    match ground.and_then(|c| reg.biome_of(c.tile)) {
        Some(Biome::Corruption) => 1,
        Some(Biome::Crimson) => 2,
        Some(Biome::Hallowed) => 3,
        _ => 0,
    }
}

/// Piece from same-family connectivity over all eight neighbors. A trunk
/// only grows an arm where the cell beside it is the lowest cell of its
/// branch (no cactus diagonally below); beside a branch stem it stays plain.
/// A branch whose lowest cell has no trunk cell diagonally above it on the
/// trunk side is a loose stub.
pub fn cactus_piece(reg: &TileRegistry, role: CactusRole, n: &Neighborhood) -> u8 {
    let at = |d: Dir| is_cactus(reg, n.get(d));
    let (up, down) = (at(Dir::North), at(Dir::South));
    match role {
        CactusRole::Trunk => {
            let west = at(Dir::West) && !at(Dir::SouthWest);
            let east = at(Dir::East) && !at(Dir::SouthEast);
            let piece = match (up, down) {
                (false, false) => TrunkPiece::Stump,
                (true, false) => TrunkPiece::Base,
                (false, true) => TrunkPiece::Top,
                (true, true) => match (west, east) {
                    (true, true) => TrunkPiece::BothArms,
                    (true, false) => TrunkPiece::MiddleLeftArm,
                    (false, true) => TrunkPiece::MiddleRightArm,
                    (false, false) => TrunkPiece::Middle,
                },
            };
            piece as u8
        }
        CactusRole::LeftBranch | CactusRole::RightBranch => {
            let trunk_above = match role {
                CactusRole::LeftBranch => at(Dir::NorthEast),
                _ => at(Dir::NorthWest),
            };
            // The lowest branch cell is the elbow that meets the trunk.
            let piece = match (down, up) {
                (false, true) if trunk_above => BranchPiece::Elbow,
                (false, _) => BranchPiece::ElbowStub,
                (true, true) => BranchPiece::Stem,
                (true, false) => BranchPiece::Tip,
            };
            piece as u8
        }
    }
}

/// Atlas frame: pieces along `u`, role rows repeated once per tint.
#[inline]
pub fn cactus_uv(role: CactusRole, piece: u8, tint: u8) -> Uv {
    Uv::new(piece, role as u8 + 3 * tint)
}
