//! Canonicalization store
//!
//! A set that, beyond membership testing, can hand back the *stored* element
//! equal to a query. This is what lets the interning index-management
//! strategy map structurally-equal indices onto one physical value: the first
//! instance stored wins, every later equal instance resolves to it.
//!
//! Absence is an error, not a sentinel: `get` on a non-member fails with
//! `NotFound`, so "absent" never collides with a legitimately stored value
//! (e.g. an `Option::None` element).

use crate::errors::{OflowError, Result};
use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Interning set with stored-element retrieval.
#[derive(Debug, Clone)]
pub struct RetrievableSet<V: Eq + Hash> {
    inner: FxHashSet<V>,
}

impl<V: Eq + Hash> Default for RetrievableSet<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Eq + Hash> RetrievableSet<V> {
    pub fn new() -> Self {
        Self {
            inner: FxHashSet::default(),
        }
    }

    /// Add an element. Returns true if it was not already present;
    /// an equal pre-existing element is kept, not replaced.
    pub fn insert(&mut self, value: V) -> bool {
        // HashSet::insert already keeps the first-stored element on equality
        self.inner.insert(value)
    }

    #[inline]
    pub fn contains(&self, value: &V) -> bool {
        self.inner.contains(value)
    }

    /// Remove the stored element equal to `value`.
    pub fn remove(&mut self, value: &V) -> bool {
        self.inner.remove(value)
    }

    /// The stored element equal to `value` (not `value` itself).
    ///
    /// Fails with `NotFound` when no equal element is stored.
    pub fn get(&self, value: &V) -> Result<&V> {
        self.inner
            .get(value)
            .ok_or_else(|| OflowError::not_found("no stored element equal to the query"))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
