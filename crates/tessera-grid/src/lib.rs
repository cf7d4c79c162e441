//! Cell storage, resolution-cache fields, and neighbor snapshots.
#![forbid(unsafe_code)]

mod cell;
mod dir;
mod grid;
mod neighborhood;
mod viewport;

pub use cell::{Cell, Liquid, LiquidKind, ResolveCache, ResolveState, Slope, VariantCache, Wires};
pub use dir::Dir;
pub use grid::TileGrid;
pub use neighborhood::{CellView, ColumnSample, ColumnScan, Neighborhood};
pub use viewport::Viewport;
