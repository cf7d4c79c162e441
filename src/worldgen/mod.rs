//! Demo world generation: noise terrain with caves, ores and the special
//! tile families laid on top so every resolver path has something to draw.

mod generate;

use std::error::Error;

use serde::Deserialize;
use tessera_tiles::{TileId, TileRegistry, WallId};

pub use generate::{Generated, generate};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct WorldGenConfig {
    #[serde(default)] pub height: Height,
    #[serde(default)] pub surface: Surface,
    #[serde(default)] pub caves: Caves,
    #[serde(default)] pub ores: Vec<OreRule>,
    #[serde(default)] pub trees: Trees,
    #[serde(default)] pub cacti: Cacti,
    #[serde(default)] pub platforms: Platforms,
    #[serde(default)] pub track: Track,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Height {
    #[serde(default = "default_height_freq")] pub frequency: f32,
    #[serde(default = "default_min_y_ratio")] pub min_y_ratio: f32,
    #[serde(default = "default_max_y_ratio")] pub max_y_ratio: f32,
}
fn default_height_freq() -> f32 { 0.012 }
fn default_min_y_ratio() -> f32 { 0.22 }
fn default_max_y_ratio() -> f32 { 0.42 }
impl Default for Height { fn default() -> Self { Self { frequency: default_height_freq(), min_y_ratio: default_min_y_ratio(), max_y_ratio: default_max_y_ratio() } } }

#[derive(Clone, Debug, Deserialize)]
pub struct Surface {
    #[serde(default = "default_climate_freq")] pub climate_frequency: f32,
    #[serde(default = "default_snow_thr")] pub snow_threshold: f32,
    #[serde(default = "default_sand_thr")] pub sand_threshold: f32,
    #[serde(default = "default_evil_thr")] pub corruption_threshold: f32,
    #[serde(default = "default_topsoil")] pub topsoil_thickness: i32,
    #[serde(default = "default_top_names")] pub top: TopNames,
    #[serde(default = "default_sub_names")] pub subsoil: SubsoilNames,
    #[serde(default = "default_wall_names")] pub walls: WallNames,
}
#[derive(Clone, Debug, Deserialize)]
pub struct TopNames { pub high: String, pub low: String, pub mid: String, pub corrupt: String, pub corrupt_low: String }
#[derive(Clone, Debug, Deserialize)]
pub struct SubsoilNames { pub near_surface: String, pub deep: String }
#[derive(Clone, Debug, Deserialize)]
pub struct WallNames { pub near_surface: String, pub deep: String }
fn default_climate_freq() -> f32 { 0.004 }
fn default_snow_thr() -> f32 { 0.45 }
fn default_sand_thr() -> f32 { -0.35 }
fn default_evil_thr() -> f32 { 0.55 }
fn default_topsoil() -> i32 { 8 }
fn default_top_names() -> TopNames {
    TopNames { high: "snow".into(), low: "sand".into(), mid: "grass".into(), corrupt: "corrupt_grass".into(), corrupt_low: "ebonsand".into() }
}
fn default_sub_names() -> SubsoilNames { SubsoilNames { near_surface: "dirt".into(), deep: "stone".into() } }
fn default_wall_names() -> WallNames { WallNames { near_surface: "dirt_wall".into(), deep: "stone_wall".into() } }
impl Default for Surface {
    fn default() -> Self {
        Self {
            climate_frequency: default_climate_freq(),
            snow_threshold: default_snow_thr(),
            sand_threshold: default_sand_thr(),
            corruption_threshold: default_evil_thr(),
            topsoil_thickness: default_topsoil(),
            top: default_top_names(),
            subsoil: default_sub_names(),
            walls: default_wall_names(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Caves {
    #[serde(default = "default_caves_enable")] pub enable: bool,
    #[serde(default = "default_cave_freq")] pub frequency: f32,
    #[serde(default = "default_cave_thr")] pub threshold: f32,
    #[serde(default = "default_cave_min_depth")] pub min_depth: i32,
    #[serde(default = "default_cobweb_prob")] pub cobweb_prob: f32,
    #[serde(default = "default_torch_prob")] pub torch_prob: f32,
    #[serde(default = "default_cobweb")] pub cobweb: String,
    #[serde(default = "default_torch")] pub torch: String,
}
fn default_caves_enable() -> bool { true }
fn default_cave_freq() -> f32 { 0.045 }
fn default_cave_thr() -> f32 { 0.42 }
fn default_cave_min_depth() -> i32 { 6 }
fn default_cobweb_prob() -> f32 { 0.04 }
fn default_torch_prob() -> f32 { 0.02 }
fn default_cobweb() -> String { "cobweb".into() }
fn default_torch() -> String { "torch".into() }
impl Default for Caves {
    fn default() -> Self {
        Self {
            enable: default_caves_enable(),
            frequency: default_cave_freq(),
            threshold: default_cave_thr(),
            min_depth: default_cave_min_depth(),
            cobweb_prob: default_cobweb_prob(),
            torch_prob: default_torch_prob(),
            cobweb: default_cobweb(),
            torch: default_torch(),
        }
    }
}

/// Replaces deep stone with `tile` where the ore noise peaks.
#[derive(Clone, Debug, Deserialize)]
pub struct OreRule {
    pub tile: String,
    #[serde(default = "default_ore_freq")] pub frequency: f32,
    #[serde(default = "default_ore_thr")] pub threshold: f32,
    #[serde(default)] pub min_depth: i32,
}
fn default_ore_freq() -> f32 { 0.11 }
fn default_ore_thr() -> f32 { 0.7 }

#[derive(Clone, Debug, Deserialize)]
pub struct Trees {
    #[serde(default = "default_tree_prob")] pub probability: f32,
    #[serde(default = "default_trunk_min")] pub trunk_min: i32,
    #[serde(default = "default_trunk_max")] pub trunk_max: i32,
    #[serde(default = "default_tree")] pub tree: String,
    #[serde(default = "default_palm")] pub palm: String,
}
fn default_tree_prob() -> f32 { 0.08 }
fn default_trunk_min() -> i32 { 4 }
fn default_trunk_max() -> i32 { 9 }
fn default_tree() -> String { "tree".into() }
fn default_palm() -> String { "palm".into() }
impl Default for Trees {
    fn default() -> Self { Self { probability: default_tree_prob(), trunk_min: default_trunk_min(), trunk_max: default_trunk_max(), tree: default_tree(), palm: default_palm() } }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Cacti {
    #[serde(default = "default_cactus_prob")] pub probability: f32,
    #[serde(default = "default_cactus_min")] pub height_min: i32,
    #[serde(default = "default_cactus_max")] pub height_max: i32,
    #[serde(default = "default_branch_prob")] pub branch_prob: f32,
    #[serde(default = "default_cactus")] pub tile: String,
}
fn default_cactus_prob() -> f32 { 0.07 }
fn default_cactus_min() -> i32 { 3 }
fn default_cactus_max() -> i32 { 6 }
fn default_branch_prob() -> f32 { 0.5 }
fn default_cactus() -> String { "cactus".into() }
impl Default for Cacti {
    fn default() -> Self { Self { probability: default_cactus_prob(), height_min: default_cactus_min(), height_max: default_cactus_max(), branch_prob: default_branch_prob(), tile: default_cactus() } }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Platforms {
    #[serde(default = "default_platform_prob")] pub probability: f32,
    #[serde(default = "default_platform_len")] pub max_length: i32,
    #[serde(default = "default_platform")] pub tile: String,
}
fn default_platform_prob() -> f32 { 0.01 }
fn default_platform_len() -> i32 { 12 }
fn default_platform() -> String { "wood_platform".into() }
impl Default for Platforms {
    fn default() -> Self { Self { probability: default_platform_prob(), max_length: default_platform_len(), tile: default_platform() } }
}

/// A minecart line laid along the surface. Tracks are framed by the editor,
/// so generation only returns the route.
#[derive(Clone, Debug, Deserialize)]
pub struct Track {
    #[serde(default = "default_track_len")] pub length: i32,
    #[serde(default = "default_track")] pub tile: String,
}
fn default_track_len() -> i32 { 48 }
fn default_track() -> String { "minecart_track".into() }
impl Default for Track { fn default() -> Self { Self { length: default_track_len(), tile: default_track() } } }

// Config with every tile name resolved against the registry.
#[derive(Clone, Debug)]
pub struct WorldGenParams {
    pub height_frequency: f32,
    pub min_y_ratio: f32,
    pub max_y_ratio: f32,
    pub climate_frequency: f32,
    pub snow_threshold: f32,
    pub sand_threshold: f32,
    pub corruption_threshold: f32,
    pub topsoil_thickness: i32,
    pub top_high: TileId,
    pub top_low: TileId,
    pub top_mid: TileId,
    pub top_corrupt: TileId,
    pub top_corrupt_low: TileId,
    pub sub_near: TileId,
    pub sub_deep: TileId,
    pub wall_near: WallId,
    pub wall_deep: WallId,
    pub caves: Caves,
    pub cobweb: TileId,
    pub torch: TileId,
    pub ores: Vec<(TileId, OreRule)>,
    pub trees: Trees,
    pub tree: TileId,
    pub palm: TileId,
    pub cacti: Cacti,
    pub cactus: TileId,
    pub platforms: Platforms,
    pub platform: TileId,
    pub track_length: i32,
    pub track: TileId,
}

impl WorldGenParams {
    pub fn from_config(cfg: &WorldGenConfig, reg: &TileRegistry) -> Result<Self, Box<dyn Error>> {
        let tile = |name: &str| -> Result<TileId, Box<dyn Error>> {
            reg.id_by_name(name).ok_or_else(|| format!("worldgen: unknown tile `{name}`").into())
        };
        let wall = |name: &str| -> Result<WallId, Box<dyn Error>> {
            reg.wall_id_by_name(name).ok_or_else(|| format!("worldgen: unknown wall `{name}`").into())
        };
        let s = &cfg.surface;
        let mut ores = Vec::with_capacity(cfg.ores.len());
        for rule in &cfg.ores {
            ores.push((tile(&rule.tile)?, rule.clone()));
        }
        Ok(Self {
            height_frequency: cfg.height.frequency,
            min_y_ratio: cfg.height.min_y_ratio,
            max_y_ratio: cfg.height.max_y_ratio,
            climate_frequency: s.climate_frequency,
            snow_threshold: s.snow_threshold,
            sand_threshold: s.sand_threshold,
            corruption_threshold: s.corruption_threshold,
            topsoil_thickness: s.topsoil_thickness,
            top_high: tile(&s.top.high)?,
            top_low: tile(&s.top.low)?,
            top_mid: tile(&s.top.mid)?,
            top_corrupt: tile(&s.top.corrupt)?,
            top_corrupt_low: tile(&s.top.corrupt_low)?,
            sub_near: tile(&s.subsoil.near_surface)?,
            sub_deep: tile(&s.subsoil.deep)?,
            wall_near: wall(&s.walls.near_surface)?,
            wall_deep: wall(&s.walls.deep)?,
            caves: cfg.caves.clone(),
            cobweb: tile(&cfg.caves.cobweb)?,
            torch: tile(&cfg.caves.torch)?,
            ores,
            trees: cfg.trees.clone(),
            tree: tile(&cfg.trees.tree)?,
            palm: tile(&cfg.trees.palm)?,
            cacti: cfg.cacti.clone(),
            cactus: tile(&cfg.cacti.tile)?,
            platforms: cfg.platforms.clone(),
            platform: tile(&cfg.platforms.tile)?,
            track_length: cfg.track.length,
            track: tile(&cfg.track.tile)?,
        })
    }
}

pub fn load_params_from_path(path: &std::path::Path, reg: &TileRegistry) -> Result<WorldGenParams, Box<dyn Error>> {
    let s = std::fs::read_to_string(path)?;
    let cfg: WorldGenConfig = toml::from_str(&s)?;
    WorldGenParams::from_config(&cfg, reg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TileRegistry {
        let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
        TileRegistry::load_from_path(root.join("tiles.toml")).unwrap()
    }

    #[test]
    fn defaults_resolve_against_demo_tiles() {
        let reg = registry();
        let p = WorldGenParams::from_config(&WorldGenConfig::default(), &reg).unwrap();
        assert_eq!(p.top_mid, reg.id_by_name("grass").unwrap());
        assert_eq!(p.wall_deep, reg.wall_id_by_name("stone_wall").unwrap());
        assert!(p.ores.is_empty());
    }

    #[test]
    fn unknown_names_fail_at_load() {
        let reg = registry();
        let cfg: WorldGenConfig = toml::from_str(
            r#"
            [[ores]]
            tile = "mithril"
            "#,
        )
        .unwrap();
        let err = WorldGenParams::from_config(&cfg, &reg).unwrap_err();
        assert!(err.to_string().contains("mithril"));
    }

    #[test]
    fn shipped_config_loads() {
        let reg = registry();
        let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
        let p = load_params_from_path(&root.join("worldgen.toml"), &reg).unwrap();
        assert_eq!(p.ores.len(), 2);
        assert!(p.caves.enable);
    }
}
