//! Blend resolution: merge predicates, the rule table, the lazy resolver,
//! special tile families, and the visible-region pass.
#![forbid(unsafe_code)]

pub mod atlas;
pub mod families;
pub mod pass;
pub mod predicate;
pub mod resolver;
pub mod rules;
pub mod seed;

pub use atlas::{AtlasLayout, RegistryAtlas, Visual};
pub use pass::{DrawItem, DrawList, PassStats, RenderPass};
pub use predicate::{BlendPlan, MergePredicate};
pub use resolver::{Resolver, ResolverConfig, Step};
pub use rules::{BlendRuleTable, RuleError, Strictness, Uv};
