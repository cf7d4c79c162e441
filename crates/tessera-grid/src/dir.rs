/// The eight neighbor directions. `y` grows downward, so `North` is `y - 1`.
/// Cardinals occupy bits 0..4 of a connectivity mask, diagonals bits 4..8.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Dir {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
    NorthEast = 4,
    SouthEast = 5,
    SouthWest = 6,
    NorthWest = 7,
}

impl Dir {
    pub const ALL: [Dir; 8] = [
        Dir::North,
        Dir::East,
        Dir::South,
        Dir::West,
        Dir::NorthEast,
        Dir::SouthEast,
        Dir::SouthWest,
        Dir::NorthWest,
    ];

    pub const CARDINALS: [Dir; 4] = [Dir::North, Dir::East, Dir::South, Dir::West];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn bit(self) -> u8 {
        1u8 << (self as u8)
    }

    /// Converts an index `[0..8)` back into a `Dir`.
    /// Falls back to `North` for out-of-range indices.
    #[inline]
    pub fn from_index(i: usize) -> Dir {
        Dir::ALL.get(i).copied().unwrap_or(Dir::North)
    }

    #[inline]
    pub fn is_cardinal(self) -> bool {
        (self as u8) < 4
    }

    #[inline]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Dir::North => (0, -1),
            Dir::East => (1, 0),
            Dir::South => (0, 1),
            Dir::West => (-1, 0),
            Dir::NorthEast => (1, -1),
            Dir::SouthEast => (1, 1),
            Dir::SouthWest => (-1, 1),
            Dir::NorthWest => (-1, -1),
        }
    }

    #[inline]
    pub fn opposite(self) -> Dir {
        match self {
            Dir::North => Dir::South,
            Dir::East => Dir::West,
            Dir::South => Dir::North,
            Dir::West => Dir::East,
            Dir::NorthEast => Dir::SouthWest,
            Dir::SouthEast => Dir::NorthWest,
            Dir::SouthWest => Dir::NorthEast,
            Dir::NorthWest => Dir::SouthEast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_negates_offset() {
        for d in Dir::ALL {
            let (dx, dy) = d.offset();
            assert_eq!(d.opposite().offset(), (-dx, -dy));
            assert_eq!(d.opposite().opposite(), d);
            assert_eq!(Dir::from_index(d.index()), d);
        }
    }

    #[test]
    fn cardinals_fill_low_nibble() {
        let m = Dir::CARDINALS.iter().fold(0u8, |m, d| m | d.bit());
        assert_eq!(m, 0x0F);
        assert!(Dir::CARDINALS.iter().all(|d| d.is_cardinal()));
        assert!(!Dir::NorthWest.is_cardinal());
    }
}
