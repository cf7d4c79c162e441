use std::sync::Arc;
use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use tessera_blend::{BlendRuleTable, RenderPass, Resolver, ResolverConfig};
use tessera_grid::{Cell, TileGrid, Viewport};
use tessera_tiles::{Layer, TileRegistry};

fn load_resolver() -> Resolver {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets");
    let reg = TileRegistry::load_from_path(root.join("tiles.toml")).unwrap();
    let tiles = BlendRuleTable::load_from_path(root.join("blend/tile_rules.toml"), Layer::Tile).unwrap();
    let walls = BlendRuleTable::load_from_path(root.join("blend/wall_rules.toml"), Layer::Wall).unwrap();
    Resolver::new(
        Arc::new(reg),
        Arc::new(tiles),
        Arc::new(walls),
        ResolverConfig::default(),
    )
}

// Layered terrain with ore pockets and caves, walls behind the ground.
fn terrain(w: usize, h: usize) -> TileGrid {
    let mut g = TileGrid::new(w, h);
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let surface = 40 + ((x as f32 * 0.07).sin() * 6.0) as i32;
            let cell = g.get_mut(x, y).unwrap();
            if y < surface {
                continue;
            }
            let cave = (x * 7 + y * 13) % 29 == 0 || (x / 5 + y / 3) % 11 == 0;
            let tile = match y - surface {
                0 => 2,
                1..=8 => 0,
                _ if (x + y) % 17 == 0 => 3,
                _ => 1,
            };
            *cell = if cave { Cell::with_wall(1) } else { Cell::with_tile(tile) };
            cell.wall = 1 + (y - surface > 8) as u16;
        }
    }
    g
}

fn bench_cold_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_pass_cold");
    group.measurement_time(Duration::from_secs(5));
    let r = load_resolver();
    let base = terrain(512, 256);
    let view = Viewport::new(100, 20, 120, 68);
    group.bench_function("120x68", |b| {
        b.iter(|| {
            let mut g = base.clone();
            let list = RenderPass::run(&r, &mut g, view);
            black_box(list.items.len());
        })
    });
    group.finish();
}

fn bench_warm_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_pass_warm");
    let r = load_resolver();
    let mut g = terrain(512, 256);
    let view = Viewport::new(100, 20, 120, 68);
    RenderPass::run(&r, &mut g, view);
    RenderPass::run(&r, &mut g, view);
    group.bench_function("120x68", |b| {
        b.iter(|| {
            let list = RenderPass::run(&r, &mut g, view);
            black_box(list.stats.cached);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_cold_pass, bench_warm_pass);
criterion_main!(benches);
