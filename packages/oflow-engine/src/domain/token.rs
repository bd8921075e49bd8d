//! Token abstraction for the flow graph
//!
//! The engine is agnostic to what flows through it: allocation sites, types,
//! symbolic values. Anything hashable and cloneable qualifies as a token.
//! Token sets are union-only for the duration of a run, so monotonicity is
//! enforced by the API rather than by convention.

use rustc_hash::FxHashSet;
use std::fmt;
use std::hash::Hash;

/// Marker trait for values that flow through the graph.
///
/// Blanket-implemented; callers never implement it by hand.
pub trait Token: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> Token for T {}

/// A monotonically growing token collection.
///
/// There is deliberately no removal API: during one analysis run a node's
/// token set only ever grows, and the fixpoint argument depends on that.
#[derive(Debug, Clone)]
pub struct TokenSet<T: Token> {
    inner: FxHashSet<T>,
}

impl<T: Token> Default for TokenSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> TokenSet<T> {
    pub fn new() -> Self {
        Self {
            inner: FxHashSet::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: FxHashSet::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn contains(&self, token: &T) -> bool {
        self.inner.contains(token)
    }

    /// Add a single token. Returns true if it was not already present.
    #[inline]
    pub fn insert(&mut self, token: T) -> bool {
        self.inner.insert(token)
    }

    /// Union another set into this one.
    pub fn union_with(&mut self, other: &TokenSet<T>) {
        for token in other.iter() {
            self.inner.insert(token.clone());
        }
    }

    pub fn extend(&mut self, tokens: impl IntoIterator<Item = T>) {
        self.inner.extend(tokens);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.inner.iter()
    }

    /// Tokens from `candidates` that are not yet in this set, deduplicated.
    ///
    /// This is the delta computation the propagation engine is built on:
    /// only genuinely new tokens travel along edges, and each at most once
    /// even when the input repeats it.
    pub fn missing_from<'a>(&self, candidates: impl IntoIterator<Item = &'a T>) -> Vec<T>
    where
        T: 'a,
    {
        let mut seen: FxHashSet<&T> = FxHashSet::default();
        candidates
            .into_iter()
            .filter(|t| !self.inner.contains(*t) && seen.insert(*t))
            .cloned()
            .collect()
    }
}

impl<T: Token> PartialEq for TokenSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: Token> Eq for TokenSet<T> {}

impl<T: Token> FromIterator<T> for TokenSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

/// Factory for token containers.
///
/// The SCC optimizer builds unified sets for collapsed components without
/// knowing how tokens are constructed; it goes through this trait.
pub trait TokenManager<T: Token> {
    /// A fresh, empty token set.
    fn empty_set(&self) -> TokenSet<T>;

    /// A set holding exactly one token.
    fn singleton(&self, token: T) -> TokenSet<T> {
        let mut set = self.empty_set();
        set.insert(token);
        set
    }
}

/// Default token manager backed by hash sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashTokenManager;

impl<T: Token> TokenManager<T> for HashTokenManager {
    fn empty_set(&self) -> TokenSet<T> {
        TokenSet::new()
    }
}
