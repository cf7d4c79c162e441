use tessera_grid::{Liquid, Slope, Wires};
use tessera_tiles::{TileId, WallId};

/// One editor operation on a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    PlaceTile { x: i32, y: i32, tile: TileId },
    ClearTile { x: i32, y: i32 },
    SetSlope { x: i32, y: i32, slope: Slope },
    SetFrame { x: i32, y: i32, u: i16, v: i16 },
    PlaceWall { x: i32, y: i32, wall: WallId },
    ClearWall { x: i32, y: i32 },
    PaintTile { x: i32, y: i32, paint: u8 },
    PaintWall { x: i32, y: i32, paint: u8 },
    SetWires { x: i32, y: i32, wires: Wires },
    SetLiquid { x: i32, y: i32, liquid: Liquid },
    /// Cycles a track switch, or toggles its bumper.
    HammerTrack { x: i32, y: i32 },
}

impl Mutation {
    pub fn pos(&self) -> (i32, i32) {
        match *self {
            Mutation::PlaceTile { x, y, .. }
            | Mutation::ClearTile { x, y }
            | Mutation::SetSlope { x, y, .. }
            | Mutation::SetFrame { x, y, .. }
            | Mutation::PlaceWall { x, y, .. }
            | Mutation::ClearWall { x, y }
            | Mutation::PaintTile { x, y, .. }
            | Mutation::PaintWall { x, y, .. }
            | Mutation::SetWires { x, y, .. }
            | Mutation::SetLiquid { x, y, .. }
            | Mutation::HammerTrack { x, y } => (x, y),
        }
    }

    /// Whether the edit changes anything resolution reads. Paint is read at
    /// draw time; wires and liquids never reach the resolver.
    pub fn touches_resolution(&self) -> bool {
        !matches!(
            self,
            Mutation::PaintTile { .. }
                | Mutation::PaintWall { .. }
                | Mutation::SetWires { .. }
                | Mutation::SetLiquid { .. }
        )
    }
}
