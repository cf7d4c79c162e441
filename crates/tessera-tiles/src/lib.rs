//! Tile, wall, and registry crate.
#![forbid(unsafe_code)]

pub mod config;
pub mod registry;
pub mod types;

pub use registry::{Blend, TileFamily, TileRegistry, TileType, WallBlend, WallType};
pub use types::{Biome, FrameSize, GroupId, Layer, TextureHandle, TileId, WallId};
