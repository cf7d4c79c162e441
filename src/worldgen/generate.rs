use fastnoise_lite::{FastNoiseLite, NoiseType};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tessera_grid::{Cell, TileGrid};
use tessera_tiles::TileId;

use super::WorldGenParams;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Climate {
    Snow,
    Desert,
    Forest,
    Corrupt,
    CorruptDesert,
}

#[derive(Copy, Clone, Debug)]
struct Column {
    surface: i32,
    climate: Climate,
}

pub struct Generated {
    pub grid: TileGrid,
    /// Surface row per column: the first ground row.
    pub surface: Vec<i32>,
    /// Cells a minecart line should be laid on, west to east.
    pub track_route: Vec<(i32, i32)>,
}

struct Ore {
    tile: TileId,
    min_depth: i32,
    threshold: f32,
    noise: FastNoiseLite,
}

fn noise(seed: i32, frequency: f32) -> FastNoiseLite {
    let mut n = FastNoiseLite::with_seed(seed);
    n.set_noise_type(Some(NoiseType::OpenSimplex2));
    n.set_frequency(Some(frequency));
    n
}

fn chance(rng: &mut SmallRng, p: f32) -> bool {
    rng.gen_bool(p.clamp(0.0, 1.0) as f64)
}

pub fn generate(p: &WorldGenParams, width: usize, height: usize, seed: u64) -> Generated {
    let s = seed as i32;
    let terrain = noise(s, p.height_frequency);
    let climate = noise(((seed as u32) ^ 0x1203_5F31) as i32, p.climate_frequency);
    let evil = noise(((seed as u32) ^ 0x92E3_A1B2) as i32, p.climate_frequency * 1.7);
    let caves = noise(s ^ 41_337, p.caves.frequency);
    let ores: Vec<Ore> = p
        .ores
        .iter()
        .enumerate()
        .map(|(i, (tile, rule))| Ore {
            tile: *tile,
            min_depth: rule.min_depth,
            threshold: rule.threshold,
            noise: noise(s ^ (99_173 + i as i32 * 7_919), rule.frequency),
        })
        .collect();

    let h = height as f32;
    let columns: Vec<Column> = (0..width)
        .into_par_iter()
        .map(|x| {
            let t = terrain.get_noise_2d(x as f32, 0.0) * 0.5 + 0.5;
            let surface = (h * (p.min_y_ratio + (p.max_y_ratio - p.min_y_ratio) * t)) as i32;
            let c = climate.get_noise_2d(x as f32, 0.0);
            let e = evil.get_noise_2d(x as f32, 0.0);
            Column {
                surface,
                climate: classify(p, c, e),
            }
        })
        .collect();

    let mut grid = TileGrid::new(width, height);
    grid.cells_mut()
        .par_chunks_mut(width.max(1))
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = ground_cell(p, columns[x], x as i32, y as i32, &caves, &ores);
            }
        });

    let mut rng = SmallRng::seed_from_u64(seed);
    plant_surface(p, &columns, &mut grid, &mut rng);
    decorate_caves(p, &columns, &mut grid, &mut rng);
    let track_route = route(p, &columns, &grid);
    log::info!(
        "generated {}x{} world: {} active tiles, track route of {} cell(s)",
        width,
        height,
        grid.cells().iter().filter(|c| c.active).count(),
        track_route.len()
    );
    Generated {
        grid,
        surface: columns.iter().map(|c| c.surface).collect(),
        track_route,
    }
}

fn classify(p: &WorldGenParams, climate: f32, evil: f32) -> Climate {
    let corrupt = evil > p.corruption_threshold;
    if climate > p.snow_threshold {
        Climate::Snow
    } else if climate < p.sand_threshold {
        if corrupt { Climate::CorruptDesert } else { Climate::Desert }
    } else if corrupt {
        Climate::Corrupt
    } else {
        Climate::Forest
    }
}

fn ground_cell(p: &WorldGenParams, col: Column, x: i32, y: i32, caves: &FastNoiseLite, ores: &[Ore]) -> Cell {
    let depth = y - col.surface;
    if depth < 0 {
        return Cell::EMPTY;
    }
    let near = depth < p.topsoil_thickness;
    let wall = if near { p.wall_near } else { p.wall_deep };
    let carved = p.caves.enable
        && depth >= p.caves.min_depth
        && caves.get_noise_2d(x as f32, y as f32 * 1.4) > p.caves.threshold;
    if carved {
        return Cell::with_wall(wall);
    }
    let tile = if depth == 0 {
        match col.climate {
            Climate::Snow => p.top_high,
            Climate::Desert => p.top_low,
            Climate::Forest => p.top_mid,
            Climate::Corrupt => p.top_corrupt,
            Climate::CorruptDesert => p.top_corrupt_low,
        }
    } else if near {
        match col.climate {
            Climate::Snow => p.top_high,
            Climate::Desert if depth < 4 => p.top_low,
            Climate::CorruptDesert if depth < 4 => p.top_corrupt_low,
            _ => p.sub_near,
        }
    } else {
        ores.iter()
            .find(|o| depth >= o.min_depth && o.noise.get_noise_2d(x as f32, y as f32) > o.threshold)
            .map_or(p.sub_deep, |o| o.tile)
    };
    let mut c = Cell::with_tile(tile);
    if depth > 0 {
        c.wall = wall;
    }
    c
}

fn is_air(grid: &TileGrid, x: i32, y: i32) -> bool {
    grid.get(x, y).is_some_and(|c| !c.active)
}

fn place(grid: &mut TileGrid, x: i32, y: i32, tile: TileId) -> Option<&mut Cell> {
    let cell = grid.get_mut(x, y)?;
    cell.tile = tile;
    cell.active = true;
    Some(cell)
}

// Trees on grass, palms and cacti on sand. Plants keep two clear columns
// between each other so cactus branches never touch a neighbor.
fn plant_surface(p: &WorldGenParams, columns: &[Column], grid: &mut TileGrid, rng: &mut SmallRng) {
    let mut last = i32::MIN / 2;
    for (x, col) in columns.iter().enumerate() {
        let x = x as i32;
        if x - last < 3 || col.surface <= 0 {
            continue;
        }
        let base = col.surface - 1;
        let flat = |dx: i32| columns.get((x + dx) as usize).is_some_and(|c| c.surface == col.surface);
        if !is_air(grid, x, base) || !grid.get(x, col.surface).is_some_and(|c| c.active) {
            continue;
        }
        match col.climate {
            Climate::Forest | Climate::Corrupt | Climate::Snow if chance(rng, p.trees.probability) => {
                let tall = rng.gen_range(p.trees.trunk_min..=p.trees.trunk_max.max(p.trees.trunk_min));
                for i in 0..tall.min(base + 1) {
                    if let Some(c) = place(grid, x, base - i, p.tree) {
                        c.frame_v = (i % 3) as i16;
                    }
                }
                last = x;
            }
            Climate::Desert | Climate::CorruptDesert if chance(rng, p.trees.probability / 3.0) => {
                let tall = rng.gen_range(p.trees.trunk_min..=p.trees.trunk_max.max(p.trees.trunk_min));
                for i in 0..tall.min(base + 1) {
                    place(grid, x, base - i, p.palm);
                }
                last = x;
            }
            Climate::Desert | Climate::CorruptDesert if chance(rng, p.cacti.probability) => {
                let tall = rng.gen_range(p.cacti.height_min..=p.cacti.height_max.max(p.cacti.height_min));
                let tall = tall.min(base + 1);
                for i in 0..tall {
                    place(grid, x, base - i, p.cactus);
                }
                for dx in [-1, 1] {
                    if tall < 3 || !flat(dx) || !chance(rng, p.cacti.branch_prob) {
                        continue;
                    }
                    // Elbow at least one row up so it never touches the ground.
                    let elbow = base - rng.gen_range(1..tall - 1);
                    let arm = rng.gen_range(1..=2).min(elbow + 1);
                    for i in 0..arm {
                        if is_air(grid, x + dx, elbow - i) {
                            place(grid, x + dx, elbow - i, p.cactus);
                        }
                    }
                }
                last = x;
            }
            _ => {}
        }
    }
}

// Cobwebs hang from cave ceilings, torches stand on cave floors, and the odd
// platform bridges a cave.
fn decorate_caves(p: &WorldGenParams, columns: &[Column], grid: &mut TileGrid, rng: &mut SmallRng) {
    let (w, h) = (grid.width as i32, grid.height as i32);
    for y in 1..h - 1 {
        for x in 0..w {
            let Some(col) = columns.get(x as usize) else { continue };
            if y - col.surface < p.caves.min_depth || !is_air(grid, x, y) {
                continue;
            }
            let ceiling = !is_air(grid, x, y - 1);
            let floor = !is_air(grid, x, y + 1);
            if ceiling && chance(rng, p.caves.cobweb_prob) {
                place(grid, x, y, p.cobweb);
            } else if floor && chance(rng, p.caves.torch_prob) {
                place(grid, x, y, p.torch);
            } else if !floor && chance(rng, p.platforms.probability) {
                let mut len = 0;
                while len < p.platforms.max_length && is_air(grid, x + len, y) {
                    place(grid, x + len, y, p.platform);
                    len += 1;
                }
            }
        }
    }
}

// The first run of open surface cells, starting a third of the way in.
fn route(p: &WorldGenParams, columns: &[Column], grid: &TileGrid) -> Vec<(i32, i32)> {
    let start = columns.len() / 3;
    columns
        .iter()
        .enumerate()
        .skip(start)
        .map(|(x, c)| (x as i32, c.surface - 1))
        .filter(|&(x, y)| is_air(grid, x, y))
        .take(p.track_length.max(0) as usize)
        .collect()
}
