use tessera_grid::{CellView, Dir, Neighborhood};
use tessera_tiles::{Blend, GroupId, TileId, TileRegistry, TileType, WallBlend, WallId};

use crate::rules::Strictness;

/// "Does this neighbor count as connected?" for one tile category.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MergePredicate {
    Identity(TileId),
    Group(GroupId),
    Target(TileId),
    AnyActive,
}

impl MergePredicate {
    /// Pure test against a neighbor's raw fields. Unregistered neighbor ids
    /// belong to no group, so they only match `Identity` or `AnyActive`.
    #[inline]
    pub fn connects(&self, reg: &TileRegistry, neighbor: TileId, active: bool) -> bool {
        if !active {
            return false;
        }
        match *self {
            MergePredicate::Identity(id) | MergePredicate::Target(id) => neighbor == id,
            MergePredicate::Group(g) => reg.group_of(neighbor) == Some(g),
            MergePredicate::AnyActive => true,
        }
    }

    /// Out-of-bounds (`None`) never connects.
    #[inline]
    pub fn connects_view(&self, reg: &TileRegistry, neighbor: Option<&CellView>) -> bool {
        neighbor.is_some_and(|n| self.connects(reg, n.tile, n.active))
    }
}

/// Predicates and rule strictness for a blending tile type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlendPlan {
    pub same: MergePredicate,
    pub merge: Option<MergePredicate>,
    pub strictness: Strictness,
}

impl BlendPlan {
    /// `None` for frame-important tiles, which draw their stored frame.
    pub fn for_tile(ty: &TileType) -> Option<BlendPlan> {
        let plan = |same, merge, strictness| BlendPlan {
            same,
            merge,
            strictness,
        };
        match ty.blend {
            Blend::None => None,
            Blend::Identity => Some(plan(MergePredicate::Identity(ty.id), None, Strictness::Generic)),
            Blend::Group(g) => Some(plan(MergePredicate::Group(g), None, Strictness::Generic)),
            Blend::AnyActive => Some(plan(MergePredicate::AnyActive, None, Strictness::Generic)),
            Blend::MergeWith { target } => Some(plan(
                MergePredicate::Identity(ty.id),
                Some(MergePredicate::Target(target)),
                Strictness::MergeTarget,
            )),
            Blend::Grass { grows_on } => Some(plan(
                MergePredicate::Identity(ty.id),
                Some(MergePredicate::Target(grows_on)),
                Strictness::Grass,
            )),
        }
    }

    /// Same and merge bits for all eight directions, evaluated on raw fields only.
    pub fn masks(&self, reg: &TileRegistry, n: &Neighborhood) -> (u8, u8) {
        let mut same = 0u8;
        let mut merge = 0u8;
        for d in Dir::ALL {
            let nb = n.get(d);
            if self.same.connects_view(reg, nb) {
                same |= d.bit();
            }
            if let Some(m) = self.merge {
                if m.connects_view(reg, nb) {
                    merge |= d.bit();
                }
            }
        }
        (same, merge)
    }
}

/// Wall connectivity: identity walls join only their own id, `Any` joins
/// every present wall.
#[inline]
pub fn wall_connects(blend: WallBlend, own: WallId, neighbor: Option<&CellView>) -> bool {
    match neighbor {
        Some(n) if n.wall != 0 => match blend {
            WallBlend::Identity => n.wall == own,
            WallBlend::Any => true,
        },
        _ => false,
    }
}

pub fn wall_mask(blend: WallBlend, own: WallId, n: &Neighborhood) -> u8 {
    Dir::ALL
        .iter()
        .filter(|d| wall_connects(blend, own, n.get(**d)))
        .fold(0u8, |m, d| m | d.bit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg() -> TileRegistry {
        TileRegistry::from_toml_str(
            r#"
            [[tiles]]
            name = "stone"
            blend = { kind = "group", group = "rock" }
            [[tiles]]
            name = "ore"
            blend = { kind = "group", group = "rock" }
            [[tiles]]
            name = "dirt"
            blend = { kind = "merge_with", target = "stone" }
            "#,
        )
        .unwrap()
    }

    #[test]
    fn inactive_never_connects() {
        let r = reg();
        for p in [
            MergePredicate::Identity(0),
            MergePredicate::Group(GroupId(0)),
            MergePredicate::Target(0),
            MergePredicate::AnyActive,
        ] {
            assert!(!p.connects(&r, 0, false));
            assert!(!p.connects_view(&r, None));
        }
    }

    #[test]
    fn group_joins_stone_and_ore_only() {
        let r = reg();
        let g = r.groups["rock"];
        let p = MergePredicate::Group(g);
        assert!(p.connects(&r, 0, true));
        assert!(p.connects(&r, 1, true));
        assert!(!p.connects(&r, 2, true));
        // Unregistered ids have no group.
        assert!(!p.connects(&r, 77, true));
        assert!(MergePredicate::Identity(77).connects(&r, 77, true));
        assert!(MergePredicate::AnyActive.connects(&r, 77, true));
    }

    #[test]
    fn merge_with_plans_target_bits() {
        let r = reg();
        let plan = BlendPlan::for_tile(r.tile(2).unwrap()).unwrap();
        assert_eq!(plan.strictness, Strictness::MergeTarget);
        assert_eq!(plan.same, MergePredicate::Identity(2));
        assert_eq!(plan.merge, Some(MergePredicate::Target(0)));
    }
}
