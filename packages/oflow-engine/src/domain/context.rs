//! Analysis context cursor
//!
//! A context captures the sensitivity dimensions under which an entity is
//! observed: current program point, current allocation site, and a k-limited
//! call string. Which dimensions an index actually uses is decided by the
//! active sensitivity policy, not by the context itself.
//!
//! Contexts are cheap to clone; callers clone around nested traversal instead
//! of mutating a shared cursor and restoring it afterwards.

/// Program point identifier (interned by the front end)
pub type ProgramPointId = u32;

/// Allocation site identifier (interned by the front end)
pub type AllocSiteId = u32;

/// Default k-limit for the call string dimension
pub const DEFAULT_CALL_DEPTH: usize = 2;

/// Sensitivity-dimension cursor for one traversal step.
#[derive(Debug, Clone)]
pub struct Context {
    program_point: Option<ProgramPointId>,
    alloc_site: Option<AllocSiteId>,

    /// Most recent call sites, oldest first
    call_string: Vec<u32>,

    /// Maximum call-string depth (k-limiting)
    max_call_depth: usize,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

// Equality and hashing cover the active dimensions only; the k-limit is a
// construction parameter, not part of the observed context.
impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.program_point == other.program_point
            && self.alloc_site == other.alloc_site
            && self.call_string == other.call_string
    }
}

impl Eq for Context {}

impl std::hash::Hash for Context {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.program_point.hash(state);
        self.alloc_site.hash(state);
        self.call_string.hash(state);
    }
}

impl Context {
    /// Empty context with the default call-string limit.
    pub fn new() -> Self {
        Self::with_call_depth(DEFAULT_CALL_DEPTH)
    }

    /// Empty context with an explicit call-string limit.
    pub fn with_call_depth(max_call_depth: usize) -> Self {
        Self {
            program_point: None,
            alloc_site: None,
            call_string: Vec::new(),
            max_call_depth,
        }
    }

    #[inline]
    pub fn program_point(&self) -> Option<ProgramPointId> {
        self.program_point
    }

    #[inline]
    pub fn set_program_point(&mut self, point: Option<ProgramPointId>) {
        self.program_point = point;
    }

    #[inline]
    pub fn alloc_site(&self) -> Option<AllocSiteId> {
        self.alloc_site
    }

    #[inline]
    pub fn set_alloc_site(&mut self, site: Option<AllocSiteId>) {
        self.alloc_site = site;
    }

    /// Push a call site onto the call string, dropping the oldest element
    /// once the k-limit is reached.
    pub fn push_call_site(&mut self, site: u32) {
        if self.max_call_depth == 0 {
            return;
        }
        self.call_string.push(site);
        if self.call_string.len() > self.max_call_depth {
            self.call_string.remove(0);
        }
    }

    #[inline]
    pub fn call_string(&self) -> &[u32] {
        &self.call_string
    }

    #[inline]
    pub fn call_depth(&self) -> usize {
        self.call_string.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_default_absent() {
        let ctx = Context::new();
        assert_eq!(ctx.program_point(), None);
        assert_eq!(ctx.alloc_site(), None);
        assert!(ctx.call_string().is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut ctx = Context::new();
        ctx.set_program_point(Some(7));
        ctx.set_alloc_site(Some(42));
        assert_eq!(ctx.program_point(), Some(7));
        assert_eq!(ctx.alloc_site(), Some(42));
    }

    #[test]
    fn test_clone_isolates_nested_traversal() {
        let mut outer = Context::new();
        outer.set_program_point(Some(1));

        let mut inner = outer.clone();
        inner.set_program_point(Some(2));
        inner.push_call_site(99);

        // The outer cursor is untouched by the nested step
        assert_eq!(outer.program_point(), Some(1));
        assert!(outer.call_string().is_empty());
    }

    #[test]
    fn test_call_string_k_limiting() {
        let mut ctx = Context::with_call_depth(3);
        for site in 1..=4 {
            ctx.push_call_site(site);
        }
        // Oldest element dropped at the limit
        assert_eq!(ctx.call_string(), &[2, 3, 4]);
    }

    #[test]
    fn test_zero_depth_call_string_stays_empty() {
        let mut ctx = Context::with_call_depth(0);
        ctx.push_call_site(5);
        assert!(ctx.call_string().is_empty());
    }

    #[test]
    fn test_value_equality_over_active_dimensions() {
        let mut a = Context::new();
        let mut b = Context::new();
        assert_eq!(a, b);

        a.set_program_point(Some(3));
        assert_ne!(a, b);

        b.set_program_point(Some(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_ignores_call_depth_limit() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut a = Context::with_call_depth(2);
        let mut b = Context::with_call_depth(5);
        a.set_program_point(Some(3));
        b.set_program_point(Some(3));
        a.push_call_site(1);
        b.push_call_site(1);

        assert_eq!(a, b);

        let digest = |ctx: &Context| {
            let mut h = DefaultHasher::new();
            ctx.hash(&mut h);
            h.finish()
        };
        assert_eq!(digest(&a), digest(&b));
    }
}
