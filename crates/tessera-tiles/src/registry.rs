use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use super::config::{BlendConfig, BlendDetailed, FamilyConfig, TilesConfig, WallBlendConfig};
use super::types::{Biome, FrameSize, GroupId, NO_WALL, TextureHandle, TileId, WallId};

/// How a block-family tile decides which neighbors it blends with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Blend {
    /// Frame-important: the stored frame is drawn as-is.
    None,
    Identity,
    Group(GroupId),
    AnyActive,
    MergeWith { target: TileId },
    Grass { grows_on: TileId },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TileFamily {
    Block,
    Platform,
    Tree,
    Palm,
    Cactus,
    Track,
}

impl TileFamily {
    /// Families whose resolution scans down a column of cells.
    #[inline]
    pub fn scans_column(self) -> bool {
        matches!(self, TileFamily::Tree | TileFamily::Palm | TileFamily::Cactus)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WallBlend {
    Identity,
    Any,
}

#[derive(Clone, Debug)]
pub struct TileType {
    pub id: TileId,
    pub name: String,
    pub solid: bool,
    pub family: TileFamily,
    pub blend: Blend,
    pub group: Option<GroupId>,
    pub biome: Option<Biome>,
    pub frame: FrameSize,
    pub variety: u8,
}

impl TileType {
    /// Stand-in for ids the registry does not know. Blends by identity so
    /// unknown tiles still draw as a coherent patch.
    pub fn placeholder(id: TileId) -> Self {
        TileType {
            id,
            name: String::new(),
            solid: true,
            family: TileFamily::Block,
            blend: Blend::Identity,
            group: None,
            biome: None,
            frame: FrameSize::TILE,
            variety: 1,
        }
    }

    #[inline]
    pub fn is_registered(&self) -> bool {
        !self.name.is_empty()
    }

    #[inline]
    pub fn texture(&self) -> TextureHandle {
        TextureHandle::Tile(self.id)
    }
}

#[derive(Clone, Debug)]
pub struct WallType {
    pub id: WallId,
    pub name: String,
    pub blend: WallBlend,
    pub frame: FrameSize,
}

impl WallType {
    /// Stand-in for wall ids the registry does not know.
    pub fn placeholder(id: WallId) -> Self {
        WallType {
            id,
            name: String::new(),
            blend: WallBlend::Any,
            frame: FrameSize::WALL,
        }
    }

    #[inline]
    pub fn texture(&self) -> TextureHandle {
        TextureHandle::Wall(self.id)
    }
}

#[derive(Clone, Debug)]
pub struct TileRegistry {
    pub tiles: Vec<TileType>,
    pub walls: Vec<WallType>,
    pub by_name: HashMap<String, TileId>,
    pub wall_by_name: HashMap<String, WallId>,
    pub groups: HashMap<String, GroupId>,
    pub padding: u16,
}

impl Default for TileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TileRegistry {
    pub fn new() -> Self {
        Self {
            tiles: Vec::new(),
            walls: vec![WallType::placeholder(NO_WALL)],
            by_name: HashMap::new(),
            wall_by_name: HashMap::new(),
            groups: HashMap::new(),
            padding: 2,
        }
    }

    /// Registered tile type for `id`; gaps and out-of-range ids yield `None`.
    #[inline]
    pub fn tile(&self, id: TileId) -> Option<&TileType> {
        self.tiles.get(id as usize).filter(|t| t.is_registered())
    }

    #[inline]
    pub fn wall(&self, id: WallId) -> Option<&WallType> {
        if id == NO_WALL {
            return None;
        }
        self.walls.get(id as usize).filter(|w| !w.name.is_empty())
    }

    pub fn id_by_name(&self, name: &str) -> Option<TileId> {
        self.by_name.get(name).copied()
    }

    pub fn wall_id_by_name(&self, name: &str) -> Option<WallId> {
        self.wall_by_name.get(name).copied()
    }

    #[inline]
    pub fn family(&self, id: TileId) -> Option<TileFamily> {
        self.tile(id).map(|t| t.family)
    }

    #[inline]
    pub fn group_of(&self, id: TileId) -> Option<GroupId> {
        self.tile(id).and_then(|t| t.group)
    }

    #[inline]
    pub fn is_solid(&self, id: TileId) -> bool {
        self.tile(id).map(|t| t.solid).unwrap_or(false)
    }

    #[inline]
    pub fn biome_of(&self, id: TileId) -> Option<Biome> {
        self.tile(id).and_then(|t| t.biome)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: TilesConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_config(cfg: TilesConfig) -> Result<Self, Box<dyn Error>> {
        let mut reg = TileRegistry::new();
        if let Some(p) = cfg.padding {
            reg.padding = p;
        }

        // Names first so merge targets may reference tiles declared later.
        let mut next_id: u16 = 0;
        let mut ids: Vec<TileId> = Vec::with_capacity(cfg.tiles.len());
        for def in &cfg.tiles {
            let id = def.id.unwrap_or(next_id);
            next_id = id.saturating_add(1);
            if reg.by_name.insert(def.name.clone(), id).is_some() {
                return Err(format!("duplicate tile name `{}`", def.name).into());
            }
            ids.push(id);
        }

        // Group names sorted so GroupId assignment is stable across runs.
        let mut group_names: Vec<&str> = cfg
            .tiles
            .iter()
            .filter_map(|d| match &d.blend {
                Some(BlendConfig::Detailed(BlendDetailed { group: Some(g), .. })) => {
                    Some(g.as_str())
                }
                _ => None,
            })
            .collect();
        group_names.sort_unstable();
        group_names.dedup();
        for (i, g) in group_names.into_iter().enumerate() {
            reg.groups.insert(g.to_string(), GroupId(i as u16));
        }

        for (def, id) in cfg.tiles.into_iter().zip(ids) {
            let family = match def.family.unwrap_or(FamilyConfig::Block) {
                FamilyConfig::Block => TileFamily::Block,
                FamilyConfig::Platform => TileFamily::Platform,
                FamilyConfig::Tree => TileFamily::Tree,
                FamilyConfig::Palm => TileFamily::Palm,
                FamilyConfig::Cactus => TileFamily::Cactus,
                FamilyConfig::Track => TileFamily::Track,
            };
            let blend = compile_blend(&reg, &def.name, def.blend.as_ref())?;
            let group = match blend {
                Blend::Group(g) => Some(g),
                _ => None,
            };
            let solid = def.solid.unwrap_or(matches!(family, TileFamily::Block));
            let frame = def
                .frame
                .map(|[w, h]| FrameSize::new(w, h))
                .unwrap_or(FrameSize::TILE);
            let ty = TileType {
                id,
                name: def.name,
                solid,
                family,
                blend,
                group,
                biome: def.biome,
                frame,
                variety: def.variety.unwrap_or(1).max(1),
            };
            if reg.tiles.len() <= id as usize {
                let start = reg.tiles.len();
                for i in start..=id as usize {
                    reg.tiles.push(TileType::placeholder(i as TileId));
                }
            }
            if reg.tiles[id as usize].is_registered() {
                return Err(format!(
                    "tile `{}` reuses id {} of `{}`",
                    ty.name, id, reg.tiles[id as usize].name
                )
                .into());
            }
            reg.tiles[id as usize] = ty;
        }

        let mut next_wall: u16 = 1;
        for def in cfg.walls {
            let id = def.id.unwrap_or(next_wall);
            if id == NO_WALL {
                return Err(format!("wall `{}` uses reserved id 0", def.name).into());
            }
            next_wall = id.saturating_add(1);
            if reg.wall_by_name.insert(def.name.clone(), id).is_some() {
                return Err(format!("duplicate wall name `{}`", def.name).into());
            }
            let ty = WallType {
                id,
                name: def.name,
                blend: match def.blend.unwrap_or(WallBlendConfig::Any) {
                    WallBlendConfig::Identity => WallBlend::Identity,
                    WallBlendConfig::Any => WallBlend::Any,
                },
                frame: def
                    .frame
                    .map(|[w, h]| FrameSize::new(w, h))
                    .unwrap_or(FrameSize::WALL),
            };
            if reg.walls.len() <= id as usize {
                let start = reg.walls.len();
                for i in start..=id as usize {
                    reg.walls.push(WallType::placeholder(i as WallId));
                }
            }
            if !reg.walls[id as usize].name.is_empty() {
                return Err(format!("wall `{}` reuses id {}", ty.name, id).into());
            }
            reg.walls[id as usize] = ty;
        }
        Ok(reg)
    }
}

fn compile_blend(
    reg: &TileRegistry,
    tile: &str,
    cfg: Option<&BlendConfig>,
) -> Result<Blend, Box<dyn Error>> {
    let lookup = |what: &str, name: Option<&String>| -> Result<TileId, Box<dyn Error>> {
        let name = name.ok_or_else(|| format!("tile `{tile}`: blend `{what}` needs a tile name"))?;
        reg.id_by_name(name)
            .ok_or_else(|| format!("tile `{tile}`: unknown {what} tile `{name}`").into())
    };
    let Some(cfg) = cfg else {
        return Ok(Blend::Identity);
    };
    match cfg {
        BlendConfig::Simple(k) => match k.as_str() {
            "none" => Ok(Blend::None),
            "identity" => Ok(Blend::Identity),
            "any" => Ok(Blend::AnyActive),
            other => Err(format!("tile `{tile}`: unknown blend `{other}`").into()),
        },
        BlendConfig::Detailed(d) => match d.kind.as_str() {
            "none" => Ok(Blend::None),
            "identity" => Ok(Blend::Identity),
            "any" => Ok(Blend::AnyActive),
            "group" => {
                let g = d
                    .group
                    .as_ref()
                    .and_then(|g| reg.groups.get(g).copied())
                    .ok_or_else(|| format!("tile `{tile}`: group blend needs `group`"))?;
                Ok(Blend::Group(g))
            }
            "merge_with" => Ok(Blend::MergeWith {
                target: lookup("merge_with", d.target.as_ref())?,
            }),
            "grass" => Ok(Blend::Grass {
                grows_on: lookup("grass", d.grows_on.as_ref().or(d.target.as_ref()))?,
            }),
            other => Err(format!("tile `{tile}`: unknown blend kind `{other}`").into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaps_in_ids_are_not_registered() {
        let reg = TileRegistry::from_toml_str(
            r#"
            [[tiles]]
            name = "dirt"
            id = 0
            [[tiles]]
            name = "stone"
            id = 4
            "#,
        )
        .unwrap();
        assert!(reg.tile(0).is_some());
        assert!(reg.tile(2).is_none());
        assert_eq!(reg.tile(4).unwrap().name, "stone");
        assert!(reg.tile(9).is_none());
    }

    #[test]
    fn merge_target_may_be_declared_later() {
        let reg = TileRegistry::from_toml_str(
            r#"
            [[tiles]]
            name = "dirt"
            blend = { kind = "merge_with", target = "stone" }
            [[tiles]]
            name = "stone"
            "#,
        )
        .unwrap();
        let dirt = reg.tile(reg.id_by_name("dirt").unwrap()).unwrap();
        assert_eq!(dirt.blend, Blend::MergeWith { target: 1 });
    }

    #[test]
    fn unknown_blend_kind_is_an_error() {
        let err = TileRegistry::from_toml_str(
            r#"
            [[tiles]]
            name = "odd"
            blend = "sparkly"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("sparkly"));
    }

    #[test]
    fn wall_zero_is_reserved() {
        let reg = TileRegistry::from_toml_str(
            r#"
            [[walls]]
            name = "stone_wall"
            "#,
        )
        .unwrap();
        assert!(reg.wall(0).is_none());
        assert_eq!(reg.wall_id_by_name("stone_wall"), Some(1));
        assert!(TileRegistry::from_toml_str("[[walls]]\nname = \"x\"\nid = 0\n").is_err());
    }
}
