//! Canonical identity keys for (entity, context) observations
//!
//! An index decides flow-graph node identity: two observations collapse to
//! one node exactly when their indices compare equal. The derived equality
//! treats an optional context component as equal only when both sides are
//! absent or both are present and equal, which is precisely the collapsing
//! rule the sensitivity policies rely on.

use super::context::{AllocSiteId, ProgramPointId};
use std::fmt;
use std::hash::Hash;

/// Marker trait for analyzed-program values tracked by the flow graph.
///
/// Entities are opaque: the engine relies only on their equality and hash.
/// Blanket-implemented; callers never implement it by hand.
pub trait Entity: Clone + Eq + Hash + fmt::Debug {}

impl<E: Clone + Eq + Hash + fmt::Debug> Entity for E {}

/// Canonical, immutable key derived from an entity and an optional
/// context component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Index<E: Entity> {
    /// Entity-only key: context ignored (insensitive analyses)
    Entity { entity: E },

    /// (entity, program point): same entity at two points stays distinct
    FlowSensitive {
        entity: E,
        point: ProgramPointId,
    },

    /// (entity, allocation-site-or-none): the `None` placeholder is the
    /// shared site used when the scope predicate excludes the entity
    SiteSensitive {
        entity: E,
        site: Option<AllocSiteId>,
    },
}

impl<E: Entity> Index<E> {
    /// The entity this index observes, regardless of variant.
    pub fn entity(&self) -> &E {
        match self {
            Index::Entity { entity }
            | Index::FlowSensitive { entity, .. }
            | Index::SiteSensitive { entity, .. } => entity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_only_equality() {
        let a: Index<&str> = Index::Entity { entity: "x" };
        let b: Index<&str> = Index::Entity { entity: "x" };
        let c: Index<&str> = Index::Entity { entity: "y" };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_flow_sensitive_distinguishes_points() {
        let p1: Index<&str> = Index::FlowSensitive { entity: "x", point: 1 };
        let p2: Index<&str> = Index::FlowSensitive { entity: "x", point: 2 };
        assert_ne!(p1, p2);
    }

    #[test]
    fn test_site_component_both_absent_or_both_equal() {
        let none_a: Index<&str> = Index::SiteSensitive { entity: "x", site: None };
        let none_b: Index<&str> = Index::SiteSensitive { entity: "x", site: None };
        let some_a: Index<&str> = Index::SiteSensitive { entity: "x", site: Some(9) };
        let some_b: Index<&str> = Index::SiteSensitive { entity: "x", site: Some(9) };
        let some_c: Index<&str> = Index::SiteSensitive { entity: "x", site: Some(10) };

        assert_eq!(none_a, none_b);
        assert_eq!(some_a, some_b);
        assert_ne!(none_a, some_a);
        assert_ne!(some_a, some_c);
    }

    #[test]
    fn test_variants_never_collapse() {
        let plain: Index<&str> = Index::Entity { entity: "x" };
        let flow: Index<&str> = Index::FlowSensitive { entity: "x", point: 0 };
        assert_ne!(plain, flow);
    }

    #[test]
    fn test_entity_accessor() {
        let idx: Index<&str> = Index::SiteSensitive { entity: "v", site: Some(3) };
        assert_eq!(*idx.entity(), "v");
    }
}
