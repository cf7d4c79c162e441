use tessera_grid::{CellView, Dir, Neighborhood};
use tessera_tiles::{TileFamily, TileRegistry};

use crate::rules::Uv;

/// Direction a rail leaves a cell on one side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Heading {
    None = 0,
    Up = 1,
    Straight = 2,
    Down = 3,
}

impl Heading {
    /// Order in which available headings are offered to the selectors.
    pub const PRIORITY: [Heading; 3] = [Heading::Straight, Heading::Up, Heading::Down];

    pub const fn from_index(i: usize) -> Heading {
        match i {
            1 => Heading::Up,
            2 => Heading::Straight,
            3 => Heading::Down,
            _ => Heading::None,
        }
    }

    /// The heading the neighbor must have on its facing side to meet this one.
    #[inline]
    pub fn mirror(self) -> Heading {
        match self {
            Heading::Up => Heading::Down,
            Heading::Down => Heading::Up,
            h => h,
        }
    }

    /// Row offset of the neighbor this heading points at.
    #[inline]
    pub fn dy(self) -> Option<i32> {
        match self {
            Heading::None => None,
            Heading::Up => Some(-1),
            Heading::Straight => Some(0),
            Heading::Down => Some(1),
        }
    }

    fn left_dir(self) -> Option<Dir> {
        match self {
            Heading::None => None,
            Heading::Up => Some(Dir::NorthWest),
            Heading::Straight => Some(Dir::West),
            Heading::Down => Some(Dir::SouthWest),
        }
    }

    fn right_dir(self) -> Option<Dir> {
        match self {
            Heading::None => None,
            Heading::Up => Some(Dir::NorthEast),
            Heading::Straight => Some(Dir::East),
            Heading::Down => Some(Dir::SouthEast),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Rail,
    Bumper,
    LeftSwitch,
    RightSwitch,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrackPiece {
    pub left: Heading,
    pub right: Heading,
    pub kind: PieceKind,
}

impl TrackPiece {
    const fn new(left: Heading, right: Heading, kind: PieceKind) -> Self {
        Self { left, right, kind }
    }
}

pub const PIECE_COUNT: usize = 40;

/// `frame_u` of a track cell that has not been framed yet.
pub const UNFRAMED: i16 = -1;

const fn build_pieces() -> [TrackPiece; PIECE_COUNT] {
    let mut t = [TrackPiece::new(Heading::None, Heading::None, PieceKind::Rail); PIECE_COUNT];
    let mut i = 0;
    while i < 16 {
        t[i] = TrackPiece::new(Heading::from_index(i / 4), Heading::from_index(i % 4), PieceKind::Rail);
        i += 1;
    }
    let mut h = 1;
    while h < 4 {
        t[15 + h] = TrackPiece::new(Heading::None, Heading::from_index(h), PieceKind::Bumper);
        t[18 + h] = TrackPiece::new(Heading::from_index(h), Heading::None, PieceKind::Bumper);
        h += 1;
    }
    let mut l = 1;
    while l < 4 {
        let mut r = 1;
        while r < 4 {
            let (lh, rh) = (Heading::from_index(l), Heading::from_index(r));
            t[22 + (l - 1) * 3 + (r - 1)] = TrackPiece::new(lh, rh, PieceKind::LeftSwitch);
            t[31 + (l - 1) * 3 + (r - 1)] = TrackPiece::new(lh, rh, PieceKind::RightSwitch);
            r += 1;
        }
        l += 1;
    }
    t
}

/// Rails `0..16` (`left * 4 + right`), bumpers `16..22`, left switches
/// `22..31`, right switches `31..40`.
pub static TRACK_PIECES: [TrackPiece; PIECE_COUNT] = build_pieces();

/// Index of the piece with the given headings and kind. Kinds that cannot
/// carry the headings fall back to the plain rail.
pub fn piece_index(left: Heading, right: Heading, kind: PieceKind) -> u8 {
    let (l, r) = (left as u8, right as u8);
    match kind {
        PieceKind::Bumper if l == 0 && r != 0 => 15 + r,
        PieceKind::Bumper if r == 0 && l != 0 => 18 + l,
        PieceKind::LeftSwitch if l != 0 && r != 0 => 22 + (l - 1) * 3 + (r - 1),
        PieceKind::RightSwitch if l != 0 && r != 0 => 31 + (l - 1) * 3 + (r - 1),
        _ => l * 4 + r,
    }
}

#[inline]
pub fn piece_frame(index: u8) -> Uv {
    Uv::new(index % 10, index / 10)
}

/// Piece stored on a framed track cell.
#[inline]
pub fn stored_piece(view: &CellView) -> Option<&'static TrackPiece> {
    usize::try_from(view.frame_u)
        .ok()
        .and_then(|i| TRACK_PIECES.get(i))
}

/// Switch selectors and bumper flag, packed into `frame_v`: low nibble left,
/// bits 4..7 right, bit 7 bumper.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Selectors {
    pub left: u8,
    pub right: u8,
    pub bumper: bool,
}

impl Selectors {
    #[inline]
    pub fn from_frame_v(v: i16) -> Self {
        let b = v as u16 as u8;
        Self {
            left: b & 0x0F,
            right: (b >> 4) & 0x07,
            bumper: b & 0x80 != 0,
        }
    }

    #[inline]
    pub fn to_frame_v(self) -> i16 {
        let b = (self.left & 0x0F) | ((self.right & 0x07) << 4) | if self.bumper { 0x80 } else { 0 };
        b as i16
    }
}

/// Headings available on one side, in priority order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    items: [Option<Heading>; 3],
    len: u8,
}

impl Options {
    fn push(&mut self, h: Heading) {
        self.items[self.len as usize] = Some(h);
        self.len += 1;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Two or more ways to go: the side is a switch.
    #[inline]
    pub fn is_switch(&self) -> bool {
        self.len >= 2
    }

    pub fn iter(&self) -> impl Iterator<Item = Heading> + '_ {
        self.items[..self.len()].iter().flatten().copied()
    }

    #[inline]
    pub fn pick(&self, selector: u8) -> Heading {
        if self.is_empty() {
            return Heading::None;
        }
        self.items[selector as usize % self.len()].unwrap_or(Heading::None)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackOptions {
    pub left: Options,
    pub right: Options,
}

#[inline]
pub fn is_track(reg: &TileRegistry, view: &CellView) -> bool {
    view.active && reg.family(view.tile) == Some(TileFamily::Track)
}

/// A neighbor can take a connection if its facing side is open or already
/// points back at this cell.
pub fn track_options(reg: &TileRegistry, n: &Neighborhood) -> TrackOptions {
    let mut out = TrackOptions::default();
    for h in Heading::PRIORITY {
        let left = h.left_dir().and_then(|d| n.get(d)).filter(|c| is_track(reg, c));
        if let Some(c) = left {
            let facing = stored_piece(c).map_or(Heading::None, |p| p.right);
            if facing == Heading::None || facing == h.mirror() {
                out.left.push(h);
            }
        }
        let right = h.right_dir().and_then(|d| n.get(d)).filter(|c| is_track(reg, c));
        if let Some(c) = right {
            let facing = stored_piece(c).map_or(Heading::None, |p| p.left);
            if facing == Heading::None || facing == h.mirror() {
                out.right.push(h);
            }
        }
    }
    out
}

/// Picks the piece for a track cell from what its neighbors offer.
pub fn select_track_piece(options: &TrackOptions, sel: Selectors) -> u8 {
    let left = options.left.pick(sel.left);
    let right = options.right.pick(sel.right);
    let both = left != Heading::None && right != Heading::None;
    let kind = if sel.bumper && (left == Heading::None) != (right == Heading::None) {
        PieceKind::Bumper
    } else if both && options.left.is_switch() {
        PieceKind::LeftSwitch
    } else if both && options.right.is_switch() {
        PieceKind::RightSwitch
    } else {
        PieceKind::Rail
    };
    piece_index(left, right, kind)
}
