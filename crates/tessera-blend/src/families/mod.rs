//! Tile families whose frame does not come from the rule table.

pub mod cactus;
pub mod platform;
pub mod track;
pub mod tree;

pub use cactus::{BranchPiece, CactusRole, CactusScan, TrunkPiece, cactus_piece, cactus_role, cactus_tint, cactus_uv};
pub use platform::{Side, platform_variant, side_class};
pub use track::{
    Heading, PieceKind, Selectors, TRACK_PIECES, TrackOptions, TrackPiece, UNFRAMED, piece_frame,
    piece_index, select_track_piece, stored_piece, track_options,
};
pub use tree::{ground_biome, palm_style, tree_style};
