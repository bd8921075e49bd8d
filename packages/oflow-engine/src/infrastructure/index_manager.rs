//! Index creation policies and management strategies
//!
//! Two orthogonal axes, each pluggable:
//! - **Sensitivity policy**: which context dimensions flow into the index
//!   (insensitive, flow-sensitive, allocation-site-sensitive).
//! - **Management strategy**: whether structurally-equal indices are interned
//!   onto one physical value (processor-intensive) or returned as-is
//!   (memory-intensive).
//!
//! The node store keys nodes by index *value*, so both management strategies
//! resolve equal observations to the same node; interning additionally keeps
//! exactly one physical index alive per distinct value.

use super::retrievable_set::RetrievableSet;
use crate::domain::context::Context;
use crate::domain::index::{Entity, Index};
use crate::errors::{OflowError, Result};
use serde::{Deserialize, Serialize};

/// Closed set of built-in sensitivity policies, for configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensitivityStrategy {
    /// Entity identity only; context ignored
    Insensitive,

    /// Distinguish observations by program point
    FlowSensitive,

    /// Distinguish observations by allocation site
    SiteSensitive,
}

impl Default for SensitivityStrategy {
    fn default() -> Self {
        SensitivityStrategy::Insensitive
    }
}

/// Computes the canonical index for an (entity, context) observation.
pub trait SensitivityPolicy<E: Entity> {
    fn create_index(&self, entity: &E, ctx: &Context) -> Result<Index<E>>;
}

/// Context-insensitive: every observation of an entity collapses to one node.
#[derive(Debug, Clone, Copy, Default)]
pub struct Insensitive;

impl<E: Entity> SensitivityPolicy<E> for Insensitive {
    fn create_index(&self, entity: &E, _ctx: &Context) -> Result<Index<E>> {
        Ok(Index::Entity {
            entity: entity.clone(),
        })
    }
}

/// Flow-sensitive: (entity, program point). A context without a program
/// point is a caller error; the engine never substitutes a default.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowSensitive;

impl<E: Entity> SensitivityPolicy<E> for FlowSensitive {
    fn create_index(&self, entity: &E, ctx: &Context) -> Result<Index<E>> {
        let point = ctx.program_point().ok_or_else(|| {
            OflowError::invalid_context("flow-sensitive indexing requires a program point")
        })?;
        Ok(Index::FlowSensitive {
            entity: entity.clone(),
            point,
        })
    }
}

/// Allocation-site-sensitive: (entity, site-or-none).
///
/// An optional scope predicate dials precision against cost: entities the
/// predicate rejects are forced onto the shared `None` placeholder site, so
/// only in-scope entities get object-sensitive treatment. A context with no
/// allocation site also maps to the placeholder; unlike the flow-sensitive
/// policy this is not an error, because the placeholder is itself a legal
/// (shared) site.
pub struct SiteSensitive<E> {
    scope: Option<Box<dyn Fn(&E) -> bool>>,
}

impl<E> std::fmt::Debug for SiteSensitive<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteSensitive")
            .field("scoped", &self.scope.is_some())
            .finish()
    }
}

impl<E: Entity> SiteSensitive<E> {
    /// Site-sensitive for every entity.
    pub fn unscoped() -> Self {
        Self { scope: None }
    }

    /// Site-sensitive only for entities the predicate accepts.
    pub fn with_scope(predicate: impl Fn(&E) -> bool + 'static) -> Self {
        Self {
            scope: Some(Box::new(predicate)),
        }
    }

    fn in_scope(&self, entity: &E) -> bool {
        self.scope.as_ref().map_or(true, |p| p(entity))
    }
}

impl<E: Entity> SensitivityPolicy<E> for SiteSensitive<E> {
    fn create_index(&self, entity: &E, ctx: &Context) -> Result<Index<E>> {
        let site = if self.in_scope(entity) {
            ctx.alloc_site()
        } else {
            None
        };
        Ok(Index::SiteSensitive {
            entity: entity.clone(),
            site,
        })
    }
}

/// Canonicalization strategy wrapped around index creation.
pub trait IndexManagement<E: Entity> {
    /// Resolve an index to its canonical equivalent.
    fn equivalent_index(&mut self, index: Index<E>) -> Index<E>;

    /// Clear all internal index state between independent runs.
    fn reset(&mut self);
}

/// Memory-intensive strategy: the argument is its own equivalent, O(1).
/// Equal-valued indices remain distinct objects; value-keyed node lookup
/// keeps them from fragmenting nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl<E: Entity> IndexManagement<E> for PassThrough {
    fn equivalent_index(&mut self, index: Index<E>) -> Index<E> {
        index
    }

    fn reset(&mut self) {}
}

/// Processor-intensive strategy: interns indices through a canonicalization
/// store, guaranteeing one physical value per distinct index at the cost of
/// a hash lookup per creation.
#[derive(Debug, Default)]
pub struct Interning<E: Entity> {
    store: RetrievableSet<Index<E>>,
}

impl<E: Entity> Interning<E> {
    pub fn new() -> Self {
        Self {
            store: RetrievableSet::new(),
        }
    }

    pub fn interned_count(&self) -> usize {
        self.store.len()
    }
}

impl<E: Entity> IndexManagement<E> for Interning<E> {
    fn equivalent_index(&mut self, index: Index<E>) -> Index<E> {
        if let Ok(stored) = self.store.get(&index) {
            return stored.clone();
        }
        self.store.insert(index.clone());
        index
    }

    fn reset(&mut self) {
        self.store.clear();
    }
}
