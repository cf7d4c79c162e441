use tessera_grid::ColumnSample;
use tessera_tiles::{Biome, TileFamily, TileRegistry};

/// Biome of the ground a tree stands on: the first active tile below that is
/// not part of a tree. Unregistered ground, the grid edge, or an exhausted
/// scan all give `Normal`.
pub fn ground_biome(reg: &TileRegistry, column: impl IntoIterator<Item = ColumnSample>) -> Biome {
    for sample in column {
        let Some(id) = sample.here.active_tile() else {
            continue;
        };
        let Some(ty) = reg.tile(id) else {
            return Biome::Normal;
        };
        if matches!(ty.family, TileFamily::Tree | TileFamily::Palm) {
            continue;
        }
        return ty.biome.unwrap_or_default();
    }
    Biome::Normal
}

/// Palms only come in four styles.
#[inline]
pub fn palm_style(biome: Biome) -> Biome {
    match biome {
        Biome::Corruption | Biome::Crimson | Biome::Hallowed => biome,
        _ => Biome::Normal,
    }
}

pub fn tree_style(reg: &TileRegistry, palm: bool, column: impl IntoIterator<Item = ColumnSample>) -> Biome {
    let biome = ground_biome(reg, column);
    if palm { palm_style(biome) } else { biome }
}
