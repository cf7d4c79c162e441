use serde::Deserialize;

use crate::types::Biome;

// Top-level tiles config file
#[derive(Deserialize, Debug, Default)]
pub struct TilesConfig {
    #[serde(default)]
    pub tiles: Vec<TileDef>,
    #[serde(default)]
    pub walls: Vec<WallDef>,
    // Pixels between neighboring frames on every atlas page.
    #[serde(default)]
    pub padding: Option<u16>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TileDef {
    pub name: String,
    #[serde(default)]
    pub id: Option<u16>,
    #[serde(default)]
    pub solid: Option<bool>,
    #[serde(default)]
    pub family: Option<FamilyConfig>,
    #[serde(default)]
    pub blend: Option<BlendConfig>,
    // Biome this tile marks when something grows on it (trees, cacti).
    #[serde(default)]
    pub biome: Option<Biome>,
    // Frame size in pixels: [width, height]
    #[serde(default)]
    pub frame: Option<[u16; 2]>,
    // Number of alternative atlas rows per style (platforms).
    #[serde(default)]
    pub variety: Option<u8>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FamilyConfig {
    Block,
    Platform,
    Tree,
    Palm,
    Cactus,
    Track,
}

// Blend config supports either a simple string ("identity") or a detailed table
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum BlendConfig {
    Simple(String),
    Detailed(BlendDetailed),
}

#[derive(Deserialize, Debug, Clone)]
pub struct BlendDetailed {
    pub kind: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub grows_on: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WallDef {
    pub name: String,
    #[serde(default)]
    pub id: Option<u16>,
    #[serde(default)]
    pub blend: Option<WallBlendConfig>,
    #[serde(default)]
    pub frame: Option<[u16; 2]>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WallBlendConfig {
    Identity,
    Any,
}
