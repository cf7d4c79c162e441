use tessera_grid::{Cell, TileGrid};
use tessera_tiles::{TileFamily, TileRegistry};

/// Resets the cell and its eight neighbors. Returns how many cells were reset.
pub fn invalidate_around(grid: &mut TileGrid, x: i32, y: i32) -> usize {
    let mut n = 0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            if let Some(c) = grid.get_mut(x + dx, y + dy) {
                c.invalidate();
                n += 1;
            }
        }
    }
    n
}

/// Resets tree and cactus cells above an edit in columns `x - 1..=x + 1`,
/// plus cactus branches hanging off any trunk found there.
///
/// Those cells read the ground under them through a column scan, so a change
/// anywhere below them within `limit` rows can move their frame. Each column
/// walk stops at the first active tile that is not a scanning family; no scan
/// from above sees past it.
pub fn invalidate_stacks_above(
    grid: &mut TileGrid,
    reg: &TileRegistry,
    x: i32,
    y: i32,
    limit: usize,
) -> usize {
    let mut n = 0;
    for cx in x - 1..=x + 1 {
        for cy in (0..y).rev().take(limit) {
            let Some(c) = grid.get_mut(cx, cy) else { break };
            if !c.active {
                continue;
            }
            if !scans(reg, c) {
                break;
            }
            c.invalidate();
            n += 1;
            if is_cactus(reg, c) {
                n += invalidate_branches(grid, reg, cx, cy);
            }
        }
    }
    n
}

// A branch starts beside a trunk cell and rises from there.
fn invalidate_branches(grid: &mut TileGrid, reg: &TileRegistry, x: i32, y: i32) -> usize {
    let mut n = 0;
    for bx in [x - 1, x + 1] {
        let mut by = y;
        while let Some(c) = grid.get_mut(bx, by) {
            if !is_cactus(reg, c) {
                break;
            }
            c.invalidate();
            n += 1;
            by -= 1;
        }
    }
    n
}

fn scans(reg: &TileRegistry, c: &Cell) -> bool {
    reg.family(c.tile).is_some_and(|f| f.scans_column())
}

fn is_cactus(reg: &TileRegistry, c: &Cell) -> bool {
    c.active && reg.family(c.tile) == Some(TileFamily::Cactus)
}
