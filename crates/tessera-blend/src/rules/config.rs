use std::fmt;

use serde::Deserialize;
use tessera_grid::Dir;

use super::{Class, Uv};

#[derive(Deserialize, Debug, Clone)]
pub struct RuleFile {
    pub default_uv: [u8; 2],
    #[serde(default)]
    pub generic: Vec<RuleDef>,
    #[serde(default)]
    pub merge: Vec<RuleDef>,
    #[serde(default)]
    pub grass: Vec<RuleDef>,
}

/// One rule: a 3x3 pattern (rows top to bottom, center `.`) and the atlas
/// frames it selects from.
#[derive(Deserialize, Debug, Clone)]
pub struct RuleDef {
    pub pattern: [String; 3],
    pub uv: Vec<[u8; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// A pattern row does not have exactly three cells.
    RowShape { section: &'static str, index: usize, row: usize },
    /// A pattern cell is not one of `1 0 m ! + ?`.
    BadClass { section: &'static str, index: usize, found: String },
    CenterNotDot { section: &'static str, index: usize },
    NoVariants { section: &'static str, index: usize },
    ReservedUv { section: &'static str, index: usize },
    ReservedDefault,
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::RowShape { section, index, row } => {
                write!(f, "{section}[{index}]: pattern row {row} must have three cells")
            }
            RuleError::BadClass {
                section,
                index,
                found,
            } => write!(f, "{section}[{index}]: unknown neighbor class `{found}`"),
            RuleError::CenterNotDot { section, index } => {
                write!(f, "{section}[{index}]: pattern center must be `.`")
            }
            RuleError::NoVariants { section, index } => {
                write!(f, "{section}[{index}]: rule lists no uv")
            }
            RuleError::ReservedUv { section, index } => {
                write!(f, "{section}[{index}]: uv (255, 255) is reserved")
            }
            RuleError::ReservedDefault => write!(f, "default_uv (255, 255) is reserved"),
        }
    }
}

impl std::error::Error for RuleError {}

/// Pattern grid positions in row order, mapped to directions.
const LAYOUT: [[Option<Dir>; 3]; 3] = [
    [Some(Dir::NorthWest), Some(Dir::North), Some(Dir::NorthEast)],
    [Some(Dir::West), None, Some(Dir::East)],
    [Some(Dir::SouthWest), Some(Dir::South), Some(Dir::SouthEast)],
];

/// A parsed rule: per direction, the set of accepted classes as a bitset
/// (`1 << class`).
#[derive(Debug, Clone)]
pub(crate) struct Rule {
    accept: [u8; 8],
    pub(crate) variants: Vec<Uv>,
}

impl Rule {
    pub(crate) fn parse(section: &'static str, index: usize, def: &RuleDef) -> Result<Rule, RuleError> {
        let mut accept = [0u8; 8];
        for (r, row) in def.pattern.iter().enumerate() {
            let cells: Vec<&str> = row.split_whitespace().collect();
            if cells.len() != 3 {
                return Err(RuleError::RowShape {
                    section,
                    index,
                    row: r,
                });
            }
            for (c, cell) in cells.into_iter().enumerate() {
                match LAYOUT[r][c] {
                    None => {
                        if cell != "." {
                            return Err(RuleError::CenterNotDot { section, index });
                        }
                    }
                    Some(d) => {
                        accept[d.index()] = accept_bits(cell).ok_or_else(|| RuleError::BadClass {
                            section,
                            index,
                            found: cell.to_string(),
                        })?;
                    }
                }
            }
        }
        if def.uv.is_empty() {
            return Err(RuleError::NoVariants { section, index });
        }
        let variants = def
            .uv
            .iter()
            .map(|&[u, v]| {
                if (u, v) == (255, 255) {
                    Err(RuleError::ReservedUv { section, index })
                } else {
                    Ok(Uv::new(u, v))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Rule { accept, variants })
    }

    #[inline]
    pub(crate) fn matches(&self, classes: &[Class; 8]) -> bool {
        classes
            .iter()
            .zip(self.accept.iter())
            .all(|(c, a)| a & (1 << *c as u8) != 0)
    }
}

fn accept_bits(cell: &str) -> Option<u8> {
    let none = 1 << Class::None as u8;
    let same = 1 << Class::Same as u8;
    let merge = 1 << Class::Merge as u8;
    Some(match cell {
        "1" => same,
        "0" => none,
        "m" => merge,
        "!" => none | merge,
        "+" => same | merge,
        "?" => none | same | merge,
        _ => return None,
    })
}
