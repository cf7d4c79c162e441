//! Blend Rule Table: connectivity key -> atlas frame, plus the validity
//! companion table.

use std::error::Error;
use std::fs;
use std::path::Path;

use tessera_grid::{Dir, VariantCache};
use tessera_tiles::Layer;

pub mod config;
mod validity;

pub use config::{RuleDef, RuleError, RuleFile};
use config::Rule;
use validity::ValidityTable;

/// Keys per strictness: three classes in each of eight directions.
pub const KEY_COUNT: usize = 6561;

/// Neighbor class in one direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Class {
    None = 0,
    Same = 1,
    Merge = 2,
}

/// Which rule section drives a lookup.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Strictness {
    Generic = 0,
    MergeTarget = 1,
    Grass = 2,
}

impl Strictness {
    pub const ALL: [Strictness; 3] = [Strictness::Generic, Strictness::MergeTarget, Strictness::Grass];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Atlas frame coordinate, in frames (not pixels).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Uv {
    pub u: u8,
    pub v: u8,
}

impl Uv {
    #[inline]
    pub const fn new(u: u8, v: u8) -> Self {
        Self { u, v }
    }

    /// Packed cache code. Never the sentinel: the builder rejects `(255, 255)`.
    #[inline]
    pub fn code(self) -> VariantCache {
        VariantCache::from_uv(self.u, self.v).unwrap_or(VariantCache::EMPTY)
    }

    #[inline]
    pub fn from_code(code: VariantCache) -> Option<Uv> {
        code.uv().map(|(u, v)| Uv::new(u, v))
    }
}

/// Class of every direction, decoded from the two bitmasks with the
/// strictness' normalization applied.
#[inline]
pub fn classes(same: u8, merge: u8, strictness: Strictness) -> [Class; 8] {
    let merge = match strictness {
        Strictness::Generic => 0,
        _ => merge & !same,
    };
    let mut out = [Class::None; 8];
    for d in Dir::ALL {
        let b = d.bit();
        out[d.index()] = if same & b != 0 {
            Class::Same
        } else if merge & b != 0 {
            Class::Merge
        } else {
            Class::None
        };
    }
    out
}

#[inline]
fn key_of(classes: &[Class; 8]) -> usize {
    classes.iter().rev().fold(0usize, |k, c| k * 3 + *c as usize)
}

fn classes_of_key(mut key: usize) -> [Class; 8] {
    let mut out = [Class::None; 8];
    for slot in out.iter_mut() {
        *slot = match key % 3 {
            1 => Class::Same,
            2 => Class::Merge,
            _ => Class::None,
        };
        key /= 3;
    }
    out
}

#[inline]
fn same_bits(classes: &[Class; 8]) -> u8 {
    Dir::CARDINALS
        .iter()
        .filter(|d| classes[d.index()] == Class::Same)
        .fold(0u8, |m, d| m | d.bit())
}

/// Immutable lookup table built once from rule data.
#[derive(Debug, Clone)]
pub struct BlendRuleTable {
    // One variant list per rule, after the default frame at index 0.
    sets: Vec<Vec<Uv>>,
    // `keys[strictness][key]` -> index into `sets`.
    keys: [Vec<u16>; 3],
    validity: [ValidityTable; 3],
}

impl BlendRuleTable {
    pub fn from_toml_str(s: &str, layer: Layer) -> Result<Self, Box<dyn Error>> {
        let file: RuleFile = toml::from_str(s)?;
        Ok(Self::from_rules(file, layer)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>, layer: Layer) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s, layer)
    }

    /// Compiles every strictness. Wall tables only use the `generic` section.
    pub fn from_rules(file: RuleFile, layer: Layer) -> Result<Self, RuleError> {
        let [du, dv] = file.default_uv;
        if (du, dv) == (255, 255) {
            return Err(RuleError::ReservedDefault);
        }
        let parse = |section: &'static str, defs: &[RuleDef]| -> Result<Vec<Rule>, RuleError> {
            defs.iter()
                .enumerate()
                .map(|(i, d)| Rule::parse(section, i, d))
                .collect()
        };
        let generic = parse("generic", &file.generic)?;
        let (merge, grass) = match layer {
            Layer::Tile => (parse("merge", &file.merge)?, parse("grass", &file.grass)?),
            Layer::Wall => {
                if !file.merge.is_empty() || !file.grass.is_empty() {
                    log::warn!("wall rules: ignoring merge/grass sections");
                }
                (Vec::new(), Vec::new())
            }
        };

        let mut table = BlendRuleTable {
            sets: vec![vec![Uv::new(du, dv)]],
            keys: Default::default(),
            validity: Default::default(),
        };
        // Each rule owns one variant set; index 0 is the default frame.
        let mut number = |rules: &[Rule]| -> Vec<u16> {
            rules
                .iter()
                .map(|r| {
                    table.sets.push(r.variants.clone());
                    (table.sets.len() - 1) as u16
                })
                .collect()
        };
        let generic_ids = number(&generic);
        let merge_ids = number(&merge);
        let grass_ids = number(&grass);
        // The matched set plus the cardinal Same bits of the classes that matched.
        let first = |rules: &[Rule], ids: &[u16], cls: &[Class; 8]| -> Option<(u16, u8)> {
            rules
                .iter()
                .zip(ids)
                .find(|(r, _)| r.matches(cls))
                .map(|(_, id)| (*id, same_bits(cls)))
        };

        for s in Strictness::ALL {
            let (own, own_ids): (&[Rule], &[u16]) = match s {
                Strictness::Generic => (&[], &[]),
                Strictness::MergeTarget => (merge.as_slice(), merge_ids.as_slice()),
                Strictness::Grass => (grass.as_slice(), grass_ids.as_slice()),
            };
            let mut keys: Vec<Option<(u16, u8)>> = vec![None; KEY_COUNT];
            for (key, slot) in keys.iter_mut().enumerate() {
                let cls = classes_of_key(key);
                *slot = match s {
                    Strictness::Generic => {
                        let flat = cls.map(|c| if c == Class::Merge { Class::None } else { c });
                        first(&generic, &generic_ids, &flat)
                    }
                    _ => first(own, own_ids, &cls).or_else(|| {
                        let relaxed = cls.map(|c| if c == Class::Merge { Class::Same } else { c });
                        first(&generic, &generic_ids, &relaxed)
                    }),
                };
            }
            // Unmatched keys share key 0's variants, else the default frame.
            let fallback = keys[0].map_or(0, |(set, _)| set);
            let unmatched = keys.iter().filter(|k| k.is_none()).count();
            if unmatched > 0 {
                log::debug!("blend rules {:?}/{:?}: {} keys use the fallback", layer, s, unmatched);
            }
            // A frame reached through the relaxed fallback draws its merge
            // sides as joined, so those sides count as same for validity.
            let validity = &mut table.validity[s.index()];
            let mut resolved: Vec<u16> = Vec::with_capacity(KEY_COUNT);
            for (key, slot) in keys.into_iter().enumerate() {
                let (set, mask) = slot.unwrap_or_else(|| (fallback, same_bits(&classes_of_key(key))));
                for uv in &table.sets[set as usize] {
                    validity.observe(uv.code().raw(), mask);
                }
                resolved.push(set);
            }
            table.keys[s.index()] = resolved;
        }
        log::info!(
            "blend rules ({:?}): {} generic, {} merge, {} grass, {} variant sets",
            layer,
            generic.len(),
            merge.len(),
            grass.len(),
            table.sets.len()
        );
        Ok(table)
    }

    /// All variants a connectivity key may pick from.
    pub fn variants(&self, same: u8, merge: u8, strictness: Strictness) -> &[Uv] {
        let key = key_of(&classes(same, merge, strictness));
        let set = self.keys[strictness.index()]
            .get(key)
            .copied()
            .unwrap_or(0);
        self.sets.get(set as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    /// O(1) lookup; `roll` picks among equally valid variants.
    #[inline]
    pub fn lookup(&self, same: u8, merge: u8, strictness: Strictness, roll: u32) -> Uv {
        let vs = self.variants(same, merge, strictness);
        if vs.is_empty() {
            return Uv::new(0, 0);
        }
        vs[roll as usize % vs.len()]
    }

    /// Cardinal directions (N, E, S, W bits) in which `uv` always has a
    /// same-class neighbor. Unseen frames report `0`.
    #[inline]
    pub fn validity_mask(&self, strictness: Strictness, uv: Uv) -> u8 {
        self.validity[strictness.index()].get(uv.code().raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = r#"
        default_uv = [9, 3]

        [[generic]]
        pattern = ["1 1 1", "1 . 1", "1 1 1"]
        uv = [[1, 1], [2, 1]]

        [[generic]]
        pattern = ["? 1 ?", "1 . 1", "? 1 ?"]
        uv = [[1, 1], [2, 1]]

        [[generic]]
        pattern = ["? 0 ?", "1 . 1", "? 1 ?"]
        uv = [[1, 0]]

        [[merge]]
        pattern = ["? m ?", "1 . 1", "? 1 ?"]
        uv = [[8, 6]]
    "#;

    #[test]
    fn key_roundtrip_through_classes() {
        for key in [0usize, 1, 2, 3, 80, 6560] {
            assert_eq!(key_of(&classes_of_key(key)), key);
        }
    }

    #[test]
    fn lookup_uses_roll_and_first_match() {
        let t = BlendRuleTable::from_toml_str(RULES, Layer::Tile).unwrap();
        assert_eq!(t.lookup(0xFF, 0, Strictness::Generic, 0), Uv::new(1, 1));
        assert_eq!(t.lookup(0xFF, 0, Strictness::Generic, 1), Uv::new(2, 1));
        assert_eq!(t.lookup(0x0F, 0, Strictness::Generic, 7), Uv::new(2, 1));
        // Top edge: E, S, W.
        assert_eq!(t.lookup(0b1110, 0, Strictness::Generic, 0), Uv::new(1, 0));
        // Nothing matches the isolated key: default frame.
        assert_eq!(t.lookup(0, 0, Strictness::Generic, 5), Uv::new(9, 3));
    }

    #[test]
    fn generic_ignores_merge_bits_and_merge_falls_back() {
        let t = BlendRuleTable::from_toml_str(RULES, Layer::Tile).unwrap();
        let n = Dir::North.bit();
        assert_eq!(t.lookup(0b1110, n, Strictness::Generic, 0), Uv::new(1, 0));
        assert_eq!(t.lookup(0b1110, n, Strictness::MergeTarget, 0), Uv::new(8, 6));
        // Same bit wins over merge bit in the same direction.
        assert_eq!(t.lookup(0x0F, 0x0F, Strictness::MergeTarget, 0), Uv::new(1, 1));
        // Grass has no rules of its own here: merge relaxed to same, generic rules.
        assert_eq!(t.lookup(0b1110, n, Strictness::Grass, 1), Uv::new(2, 1));
    }

    #[test]
    fn wall_tables_drop_merge_rules() {
        let t = BlendRuleTable::from_toml_str(RULES, Layer::Wall).unwrap();
        let n = Dir::North.bit();
        assert_eq!(t.lookup(0b1110, n, Strictness::MergeTarget, 0), Uv::new(1, 1));
    }

    #[test]
    fn validity_tracks_guaranteed_cardinals() {
        let t = BlendRuleTable::from_toml_str(RULES, Layer::Tile).unwrap();
        assert_eq!(t.validity_mask(Strictness::Generic, Uv::new(1, 1)), 0x0F);
        assert_eq!(t.validity_mask(Strictness::Generic, Uv::new(1, 0)), 0b1110);
        assert_eq!(t.validity_mask(Strictness::Generic, Uv::new(9, 3)), 0);
        assert_eq!(t.validity_mask(Strictness::Generic, Uv::new(40, 40)), 0);
        // The merge frame only ever has S, E, W as same.
        assert_eq!(t.validity_mask(Strictness::MergeTarget, Uv::new(8, 6)), 0b1110);
        // Reached with merge sides relaxed to same: still joined on all four.
        assert_eq!(t.validity_mask(Strictness::MergeTarget, Uv::new(1, 1)), 0x0F);
        assert_eq!(t.validity_mask(Strictness::Grass, Uv::new(1, 0)), 0b1110);
    }

    #[test]
    fn reserved_default_is_rejected() {
        let err = BlendRuleTable::from_toml_str("default_uv = [255, 255]", Layer::Tile).unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }
}
