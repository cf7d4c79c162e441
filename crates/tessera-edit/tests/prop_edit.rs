use std::path::PathBuf;
use std::sync::Arc;

use proptest::prelude::*;
use tessera_blend::{BlendRuleTable, RenderPass, Resolver, ResolverConfig};
use tessera_edit::{Editor, Mutation};
use tessera_grid::{Cell, Slope, TileGrid, Viewport};
use tessera_tiles::{Layer, TileId, TileRegistry};

fn setup(seed: u64) -> (Arc<TileRegistry>, Resolver) {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets");
    let reg = Arc::new(TileRegistry::load_from_path(root.join("tiles.toml")).unwrap());
    let tiles = BlendRuleTable::load_from_path(root.join("blend/tile_rules.toml"), Layer::Tile).unwrap();
    let walls = BlendRuleTable::load_from_path(root.join("blend/wall_rules.toml"), Layer::Wall).unwrap();
    let r = Resolver::new(
        Arc::clone(&reg),
        Arc::new(tiles),
        Arc::new(walls),
        ResolverConfig {
            seed,
            ..Default::default()
        },
    );
    (reg, r)
}

// Blends, sands, a platform, tree, palm, cactus and a torch.
const PALETTE: [TileId; 13] = [0, 1, 2, 3, 5, 6, 9, 11, 17, 18, 19, 20, 22];
const TRACK: TileId = 21;

fn slope() -> impl Strategy<Value = Slope> {
    prop::sample::select(vec![
        Slope::Full,
        Slope::HalfBrick,
        Slope::TopRight,
        Slope::TopLeft,
        Slope::BottomRight,
        Slope::BottomLeft,
    ])
}

fn mutation(w: i32, h: i32) -> impl Strategy<Value = Mutation> {
    let pos = (0..w, 0..h);
    let tile = prop::sample::select(PALETTE.to_vec());
    prop_oneof![
        3 => (pos.clone(), tile).prop_map(|((x, y), tile)| Mutation::PlaceTile { x, y, tile }),
        2 => pos.clone().prop_map(|(x, y)| Mutation::ClearTile { x, y }),
        1 => pos.clone().prop_map(|(x, y)| Mutation::PlaceTile { x, y, tile: TRACK }),
        1 => (pos.clone(), slope()).prop_map(|((x, y), slope)| Mutation::SetSlope { x, y, slope }),
        1 => (pos.clone(), 1u16..4).prop_map(|((x, y), wall)| Mutation::PlaceWall { x, y, wall }),
        1 => pos.clone().prop_map(|(x, y)| Mutation::ClearWall { x, y }),
        1 => (pos, any::<u8>()).prop_map(|((x, y), paint)| Mutation::PaintTile { x, y, paint }),
    ]
}

fn scenario() -> impl Strategy<Value = (usize, usize, Vec<Option<TileId>>, Vec<Mutation>)> {
    (4usize..12, 4usize..12).prop_flat_map(|(w, h)| {
        let cell = prop::option::weighted(0.6, prop::sample::select(PALETTE.to_vec()));
        (
            Just(w),
            Just(h),
            prop::collection::vec(cell, w * h),
            prop::collection::vec(mutation(w as i32, h as i32), 1..12),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // After any batch of edits on a settled grid, three passes draw exactly
    // what a from-scratch resolve of the edited grid draws.
    #[test]
    fn edits_converge_to_fresh_resolve((w, h, tiles, edits) in scenario(), seed in any::<u64>()) {
        let (reg, r) = setup(seed);
        let cells = tiles
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let mut c = t.map(Cell::with_tile).unwrap_or(Cell::EMPTY);
                c.wall = (i % 3) as u16;
                c
            })
            .collect();
        let mut g = TileGrid::from_cells(w, h, cells).unwrap();
        let view = Viewport::new(0, 0, w as i32, h as i32);
        RenderPass::run(&r, &mut g, view);
        RenderPass::run(&r, &mut g, view);

        let mut ed = Editor::new(reg, r.config().scan_limit);
        for m in edits {
            prop_assert!(ed.apply(&mut g, m).is_ok());
        }
        let mut incremental = RenderPass::run(&r, &mut g, view);
        for _ in 0..2 {
            incremental = RenderPass::run(&r, &mut g, view);
        }
        prop_assert_eq!(g.count_unresolved(), 0);

        let mut fresh = g.clone();
        fresh.invalidate_all();
        let mut expected = RenderPass::run(&r, &mut fresh, view);
        for _ in 0..2 {
            expected = RenderPass::run(&r, &mut fresh, view);
        }
        prop_assert_eq!(incremental.items, expected.items);
    }
}
