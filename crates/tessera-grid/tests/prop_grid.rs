use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use tessera_grid::{Cell, Dir, ResolveState, Slope, TileGrid, VariantCache, Viewport};

#[derive(Serialize, Deserialize)]
struct Saved {
    cells: Vec<Cell>,
}

#[test]
fn cache_is_not_persisted() {
    let mut c = Cell::with_tile(4);
    c.slope = Slope::TopLeft;
    c.frame_u = 3;
    c.cache_mut()
        .store_tile(VariantCache::from_uv(1, 1).unwrap(), true, 0x0F);
    let text = toml::to_string(&Saved { cells: vec![c] }).unwrap();
    assert!(!text.contains("cache"));
    let back: Saved = toml::from_str(&text).unwrap();
    let loaded = back.cells[0];
    assert_eq!(loaded.tile, 4);
    assert_eq!(loaded.slope, Slope::TopLeft);
    assert_eq!(loaded.frame_u, 3);
    assert_eq!(loaded.cache().state(), ResolveState::Unresolved);
}

#[test]
fn minimal_cell_parses_with_defaults() {
    let back: Saved = toml::from_str("[[cells]]\ntile = 2\nactive = true\n").unwrap();
    let c = back.cells[0];
    assert_eq!(c.slope, Slope::Full);
    assert_eq!(c.wall, 0);
    assert!(!c.is_resolved());
}

proptest! {
    // Every in-bounds neighbor reported by a neighborhood matches a direct lookup.
    #[test]
    fn neighborhood_matches_direct_lookup(
        w in 1usize..12,
        h in 1usize..12,
        x in -2i32..14,
        y in -2i32..14,
    ) {
        let mut g = TileGrid::new(w, h);
        for (i, c) in g.cells_mut().iter_mut().enumerate() {
            *c = Cell::with_tile((i % 7) as u16);
        }
        match g.neighborhood(x, y) {
            None => prop_assert!(!g.contains(x, y)),
            Some(n) => {
                for d in Dir::ALL {
                    let (dx, dy) = d.offset();
                    prop_assert_eq!(n.get(d).copied(), g.view(x + dx, y + dy));
                }
            }
        }
    }

    // The margin-expanded, clamped viewport never leaves the grid.
    #[test]
    fn clamped_viewport_stays_inside(
        w in 0usize..20,
        h in 0usize..20,
        vx in -10i32..30,
        vy in -10i32..30,
        vw in 0i32..25,
        vh in 0i32..25,
    ) {
        let g = TileGrid::new(w, h);
        let v = Viewport::new(vx, vy, vw, vh).expand(1).clamp_to(w, h);
        for (cx, cy) in v.cells() {
            prop_assert!(g.contains(cx, cy));
        }
    }
}
