//! ASCII view of a resolved region, one glyph per cell.

use std::io::{self, Write};

use tessera_blend::families::{Heading, stored_piece};
use tessera_grid::{CellView, ResolveState, TileGrid, Viewport};
use tessera_tiles::{Blend, TileFamily, TileId, TileRegistry};

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Writes the view row by row followed by a legend. Block tiles get a letter
/// per type in order of first appearance; uppercase marks a cell that is not
/// fully resolved yet.
pub fn write_dump(out: &mut impl Write, reg: &TileRegistry, grid: &TileGrid, view: Viewport) -> io::Result<()> {
    let mut legend: Vec<TileId> = Vec::new();
    for y in view.y..view.y + view.height {
        let mut line = String::with_capacity(view.width.max(0) as usize);
        for x in view.x..view.x + view.width {
            let Some(c) = grid.view(x, y) else {
                line.push(' ');
                continue;
            };
            line.push(glyph(reg, &c, &mut legend));
        }
        writeln!(out, "{}", line.trim_end())?;
    }
    writeln!(out)?;
    for (i, id) in legend.iter().enumerate() {
        let name = reg.tile(*id).map_or("?", |t| t.name.as_str());
        writeln!(out, "  {} = {name} ({id})", LETTERS[i % LETTERS.len()] as char)?;
    }
    writeln!(
        out,
        "  . wall  = platform  T tree  P palm  C cactus  ~ cobweb  * frame-only  track: - / \\ ^"
    )
}

fn glyph(reg: &TileRegistry, c: &CellView, legend: &mut Vec<TileId>) -> char {
    if !c.active {
        return if c.wall != 0 { '.' } else { ' ' };
    }
    let Some(ty) = reg.tile(c.tile) else { return '?' };
    match ty.family {
        TileFamily::Platform => '=',
        TileFamily::Tree => 'T',
        TileFamily::Palm => 'P',
        TileFamily::Cactus => 'C',
        TileFamily::Track => track_glyph(c),
        TileFamily::Block => match ty.blend {
            Blend::None => '*',
            Blend::AnyActive => '~',
            _ => {
                let i = legend.iter().position(|&id| id == c.tile).unwrap_or_else(|| {
                    legend.push(c.tile);
                    legend.len() - 1
                });
                let ch = LETTERS[i % LETTERS.len()] as char;
                if c.state == ResolveState::Resolved { ch } else { ch.to_ascii_uppercase() }
            }
        },
    }
}

fn track_glyph(c: &CellView) -> char {
    match stored_piece(c).map(|p| (p.left, p.right)) {
        Some((Heading::Up, _)) | Some((_, Heading::Down)) => '\\',
        Some((Heading::Down, _)) | Some((_, Heading::Up)) => '/',
        Some((Heading::None, Heading::None)) | None => '^',
        Some(_) => '-',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_grid::Cell;

    #[test]
    fn glyphs_and_legend() {
        let reg = TileRegistry::from_toml_str(
            r#"
            [[tiles]]
            id = 0
            name = "dirt"

            [[tiles]]
            id = 1
            name = "web"
            solid = false
            blend = "any"

            [[tiles]]
            id = 2
            name = "plank"
            family = "platform"

            [[walls]]
            id = 1
            name = "stone_wall"
            "#,
        )
        .unwrap();
        let mut g = TileGrid::new(4, 2);
        *g.get_mut(0, 0).unwrap() = Cell::with_tile(0);
        *g.get_mut(1, 0).unwrap() = Cell::with_tile(1);
        *g.get_mut(2, 0).unwrap() = Cell::with_tile(2);
        *g.get_mut(0, 1).unwrap() = Cell::with_wall(1);
        let mut out = Vec::new();
        write_dump(&mut out, &reg, &g, Viewport::new(0, 0, 4, 2)).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        // Nothing resolved yet, so the dirt letter is uppercase.
        assert_eq!(lines.next(), Some("A~="));
        assert_eq!(lines.next(), Some("."));
        assert!(text.contains("a = dirt (0)"));
    }
}
