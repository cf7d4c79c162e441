use std::collections::BTreeSet;

use proptest::prelude::*;
use tessera_tiles::config::{BlendConfig, BlendDetailed, TileDef, TilesConfig};
use tessera_tiles::{Biome, Blend, TileFamily, TileRegistry};

fn load_assets() -> TileRegistry {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    TileRegistry::load_from_path(root.join("../../assets/tiles.toml")).unwrap()
}

fn plain(name: &str, id: u16) -> TileDef {
    TileDef {
        name: name.into(),
        id: Some(id),
        solid: None,
        family: None,
        blend: None,
        biome: None,
        frame: None,
        variety: None,
    }
}

#[test]
fn asset_registry_compiles_every_blend_kind() {
    let reg = load_assets();
    let stone = reg.id_by_name("stone").unwrap();
    let ore = reg.id_by_name("iron_ore").unwrap();
    assert_eq!(reg.group_of(stone), reg.group_of(ore));
    assert!(reg.group_of(stone).is_some());

    let dirt = reg.tile(reg.id_by_name("dirt").unwrap()).unwrap();
    assert_eq!(dirt.blend, Blend::MergeWith { target: stone });

    let grass = reg.tile(reg.id_by_name("grass").unwrap()).unwrap();
    assert_eq!(grass.blend, Blend::Grass { grows_on: dirt.id });

    let web = reg.tile(reg.id_by_name("cobweb").unwrap()).unwrap();
    assert_eq!(web.blend, Blend::AnyActive);
    assert!(!web.solid);

    let torch = reg.tile(reg.id_by_name("torch").unwrap()).unwrap();
    assert_eq!(torch.blend, Blend::None);
}

#[test]
fn asset_registry_families_and_biomes() {
    let reg = load_assets();
    let platform = reg.tile(reg.id_by_name("wood_platform").unwrap()).unwrap();
    assert_eq!(platform.family, TileFamily::Platform);
    assert_eq!(platform.variety, 3);
    assert!(!platform.solid);
    assert_eq!(reg.family(reg.id_by_name("cactus").unwrap()), Some(TileFamily::Cactus));
    assert!(TileFamily::Palm.scans_column());
    assert!(!TileFamily::Track.scans_column());
    assert_eq!(
        reg.biome_of(reg.id_by_name("ebonsand").unwrap()),
        Some(Biome::Corruption)
    );
    assert_eq!(reg.biome_of(reg.id_by_name("stone").unwrap()), None);
}

#[test]
fn group_ids_are_assigned_in_name_order() {
    let group = |g: &str| BlendConfig::Detailed(BlendDetailed {
        kind: "group".into(),
        group: Some(g.into()),
        target: None,
        grows_on: None,
    });
    let mut a = plain("a", 0);
    a.blend = Some(group("zeta"));
    let mut b = plain("b", 1);
    b.blend = Some(group("alpha"));
    let reg = TileRegistry::from_config(TilesConfig {
        tiles: vec![a, b],
        walls: Vec::new(),
        padding: None,
    })
    .unwrap();
    assert_eq!(reg.groups["alpha"].0, 0);
    assert_eq!(reg.groups["zeta"].0, 1);
    assert_eq!(reg.group_of(1), Some(reg.groups["alpha"]));
}

#[test]
fn biome_index_falls_back_to_normal() {
    for b in Biome::ALL {
        assert_eq!(Biome::from_index(b.index()), b);
    }
    assert_eq!(Biome::from_index(250), Biome::Normal);
}

proptest! {
    // Exactly the declared ids are registered; everything else is a gap.
    #[test]
    fn declared_ids_are_the_only_registered(ids in prop::collection::btree_set(0u16..200, 1..20)) {
        let defs: Vec<TileDef> = ids
            .iter()
            .map(|&id| plain(&format!("t{id}"), id))
            .collect();
        let reg = TileRegistry::from_config(TilesConfig { tiles: defs, walls: Vec::new(), padding: None }).unwrap();
        let declared: BTreeSet<u16> = ids.clone();
        for id in 0u16..220 {
            prop_assert_eq!(reg.tile(id).is_some(), declared.contains(&id));
            if let Some(t) = reg.tile(id) {
                prop_assert_eq!(t.id, id);
            }
        }
    }
}
