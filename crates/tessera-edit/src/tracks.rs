//! Minecart track placement, removal and hammering.
//!
//! Track pieces live in the cell's frame fields rather than the resolve
//! cache, so the editor frames them eagerly and then re-frames whatever the
//! changed pieces point at.

use std::collections::VecDeque;

use hashbrown::HashSet;
use tessera_blend::families::track::is_track;
use tessera_blend::families::{
    Selectors, TRACK_PIECES, TrackPiece, UNFRAMED, select_track_piece, stored_piece, track_options,
};
use tessera_grid::{Slope, TileGrid};
use tessera_tiles::{TileFamily, TileId, TileRegistry};

use crate::error::EditError;
use crate::invalidate::invalidate_around;

/// Result of one track edit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackEdit {
    /// Cells whose piece was recomputed, in visit order.
    pub updated: Vec<(i32, i32)>,
    pub invalidated: usize,
}

/// Lays a track tile at `(x, y)` and frames it against its neighbors.
pub fn place_track(
    grid: &mut TileGrid,
    reg: &TileRegistry,
    x: i32,
    y: i32,
    tile: TileId,
) -> Result<TrackEdit, EditError> {
    if reg.family(tile) != Some(TileFamily::Track) {
        return Err(EditError::NotTrack { x, y });
    }
    let cell = grid.get_mut(x, y).ok_or(EditError::OutOfBounds { x, y })?;
    cell.tile = tile;
    cell.active = true;
    cell.slope = Slope::Full;
    cell.frame_u = UNFRAMED;
    cell.frame_v = 0;
    let mut edit = TrackEdit {
        invalidated: invalidate_around(grid, x, y),
        ..Default::default()
    };
    propagate(grid, reg, &[(x, y)], &mut edit);
    log::trace!("track placed at ({x}, {y}); {} cell(s) re-framed", edit.updated.len());
    Ok(edit)
}

/// Removes the track at `(x, y)` and re-frames every track that pointed at it.
pub fn erase_track(
    grid: &mut TileGrid,
    reg: &TileRegistry,
    x: i32,
    y: i32,
) -> Result<TrackEdit, EditError> {
    let view = grid.view(x, y).ok_or(EditError::OutOfBounds { x, y })?;
    if !is_track(reg, &view) {
        return Err(EditError::NotTrack { x, y });
    }
    let mut origins: Vec<(i32, i32)> = targets(stored_piece(&view), x, y).collect();
    for nx in [x - 1, x + 1] {
        for ny in y - 1..=y + 1 {
            let Some(nv) = grid.view(nx, ny) else { continue };
            if is_track(reg, &nv) && targets(stored_piece(&nv), nx, ny).any(|p| p == (x, y)) {
                origins.push((nx, ny));
            }
        }
    }
    if let Some(cell) = grid.get_mut(x, y) {
        cell.active = false;
        cell.frame_u = 0;
        cell.frame_v = 0;
    }
    let mut edit = TrackEdit {
        invalidated: invalidate_around(grid, x, y),
        ..Default::default()
    };
    propagate(grid, reg, &origins, &mut edit);
    Ok(edit)
}

/// Cycles the left switch if that side is one, else the right switch, else
/// toggles the bumper flag. The new piece is framed immediately.
pub fn hammer_track(
    grid: &mut TileGrid,
    reg: &TileRegistry,
    x: i32,
    y: i32,
) -> Result<TrackEdit, EditError> {
    let n = grid.neighborhood(x, y).ok_or(EditError::OutOfBounds { x, y })?;
    if !is_track(reg, &n.center) {
        return Err(EditError::NotTrack { x, y });
    }
    let opts = track_options(reg, &n);
    let mut sel = Selectors::from_frame_v(n.center.frame_v);
    if opts.left.is_switch() {
        sel.left = cycle(sel.left, opts.left.len());
    } else if opts.right.is_switch() {
        sel.right = cycle(sel.right, opts.right.len());
    } else {
        sel.bumper = !sel.bumper;
    }
    if let Some(cell) = grid.get_mut(x, y) {
        cell.frame_v = sel.to_frame_v();
    }
    let mut edit = TrackEdit::default();
    propagate(grid, reg, &[(x, y)], &mut edit);
    Ok(edit)
}

fn cycle(selector: u8, len: usize) -> u8 {
    ((selector as usize % len + 1) % len) as u8
}

/// Cells a piece's headings point at.
fn targets(piece: Option<&TrackPiece>, x: i32, y: i32) -> impl Iterator<Item = (i32, i32)> {
    piece.into_iter().flat_map(move |p| {
        let left = p.left.dy().map(|dy| (x - 1, y + dy));
        let right = p.right.dy().map(|dy| (x + 1, y + dy));
        left.into_iter().chain(right)
    })
}

/// Recomputes the stored piece from the current neighbors and selectors.
fn reframe(
    grid: &mut TileGrid,
    reg: &TileRegistry,
    x: i32,
    y: i32,
) -> Option<(Option<&'static TrackPiece>, &'static TrackPiece)> {
    let n = grid.neighborhood(x, y)?;
    let old = stored_piece(&n.center);
    let index = select_track_piece(&track_options(reg, &n), Selectors::from_frame_v(n.center.frame_v));
    let new = TRACK_PIECES.get(index as usize)?;
    grid.get_mut(x, y)?.frame_u = index as i16;
    Some((old, new))
}

// Origins always spread along their old and new headings. Other cells spread
// only when their piece actually changed.
fn propagate(grid: &mut TileGrid, reg: &TileRegistry, origins: &[(i32, i32)], edit: &mut TrackEdit) {
    let mut seen: HashSet<(i32, i32)> = HashSet::new();
    let mut work: VecDeque<((i32, i32), bool)> = origins.iter().map(|&p| (p, true)).collect();
    while let Some(((x, y), origin)) = work.pop_front() {
        if !seen.insert((x, y)) {
            continue;
        }
        if !grid.view(x, y).is_some_and(|v| is_track(reg, &v)) {
            continue;
        }
        let Some((old, new)) = reframe(grid, reg, x, y) else { continue };
        edit.updated.push((x, y));
        let changed = old != Some(new);
        if changed {
            edit.invalidated += invalidate_around(grid, x, y);
        }
        if origin || changed {
            work.extend(targets(old, x, y).chain(targets(Some(new), x, y)).map(|p| (p, false)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_blend::families::{Heading, PieceKind, piece_index};

    fn registry() -> TileRegistry {
        TileRegistry::from_toml_str(
            r#"
            [[tiles]]
            id = 0
            name = "track"
            family = "track"
            solid = false
            "#,
        )
        .unwrap()
    }

    fn piece(g: &TileGrid, x: i32, y: i32) -> TrackPiece {
        TRACK_PIECES[g.get(x, y).unwrap().frame_u as usize]
    }

    #[test]
    fn straight_line_links_both_ends() {
        let reg = registry();
        let mut g = TileGrid::new(6, 3);
        place_track(&mut g, &reg, 1, 1, 0).unwrap();
        let edit = place_track(&mut g, &reg, 2, 1, 0).unwrap();
        assert_eq!(edit.updated, vec![(2, 1), (1, 1)]);
        assert_eq!(piece(&g, 1, 1).right, Heading::Straight);
        assert_eq!(piece(&g, 2, 1).left, Heading::Straight);
        assert_eq!(piece(&g, 2, 1).right, Heading::None);
    }

    #[test]
    fn erase_releases_the_neighbor() {
        let reg = registry();
        let mut g = TileGrid::new(6, 3);
        place_track(&mut g, &reg, 1, 1, 0).unwrap();
        place_track(&mut g, &reg, 2, 1, 0).unwrap();
        let edit = erase_track(&mut g, &reg, 2, 1).unwrap();
        assert_eq!(edit.updated, vec![(1, 1)]);
        assert_eq!(g.get(1, 1).unwrap().frame_u, 0);
        assert!(!g.get(2, 1).unwrap().active);
        assert_eq!(erase_track(&mut g, &reg, 2, 1), Err(EditError::NotTrack { x: 2, y: 1 }));
    }

    #[test]
    fn hammer_cycles_switch_then_toggles_bumper() {
        let reg = registry();
        let mut g = TileGrid::new(5, 5);
        // Two branches open to the west of (2, 2): straight and up.
        place_track(&mut g, &reg, 1, 2, 0).unwrap();
        place_track(&mut g, &reg, 1, 1, 0).unwrap();
        place_track(&mut g, &reg, 3, 2, 0).unwrap();
        place_track(&mut g, &reg, 2, 2, 0).unwrap();
        let p = piece(&g, 2, 2);
        assert_eq!((p.left, p.kind), (Heading::Straight, PieceKind::LeftSwitch));
        hammer_track(&mut g, &reg, 2, 2).unwrap();
        let p = piece(&g, 2, 2);
        assert_eq!((p.left, p.right), (Heading::Up, Heading::Straight));
        assert_eq!(p.kind, PieceKind::LeftSwitch);
        // The straight west neighbor no longer has anything to meet.
        assert_eq!(piece(&g, 1, 2).right, Heading::None);

        let mut lone = TileGrid::new(4, 3);
        place_track(&mut lone, &reg, 1, 1, 0).unwrap();
        place_track(&mut lone, &reg, 2, 1, 0).unwrap();
        hammer_track(&mut lone, &reg, 2, 1).unwrap();
        assert_eq!(
            lone.get(2, 1).unwrap().frame_u as u8,
            piece_index(Heading::Straight, Heading::None, PieceKind::Bumper)
        );
    }

    #[test]
    fn rejects_non_track_cells() {
        let reg = registry();
        let mut g = TileGrid::new(3, 3);
        assert_eq!(hammer_track(&mut g, &reg, 1, 1), Err(EditError::NotTrack { x: 1, y: 1 }));
        assert_eq!(hammer_track(&mut g, &reg, 9, 1), Err(EditError::OutOfBounds { x: 9, y: 1 }));
        assert_eq!(place_track(&mut g, &reg, 1, 1, 7), Err(EditError::NotTrack { x: 1, y: 1 }));
    }
}
