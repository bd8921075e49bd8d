//! Flow graph arena and worklist propagation
//!
//! Nodes are arena-allocated; each node's token set and successor set live in
//! a *slot*. Before any collapsing, node and slot are one-to-one. When the
//! SCC optimizer collapses a component, every member node is repointed at the
//! representative slot through a union-find redirect table, so the members
//! share one token set and one successor set without reference counting.
//!
//! Propagation is delta-driven: a work item is (slot, newly-arrived tokens),
//! and only tokens a target does not already hold travel further. The
//! worklist drains to quiescence inside every mutating call, so callers
//! always observe a fixpoint.

use crate::domain::token::{Token, TokenSet};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Flow graph node identifier
pub type NodeId = u32;

/// Physical storage slot identifier (internal; nodes share slots after collapse)
pub(crate) type SlotId = u32;

/// Propagation statistics
#[derive(Debug, Clone, Default)]
pub struct PropagationStats {
    /// Calls to `inject_tokens`
    pub injections: usize,

    /// Work items enqueued (non-empty deltas)
    pub deltas_enqueued: usize,

    /// Deliveries that actually grew a token set
    pub propagations: usize,

    /// Work items drained
    pub drained: usize,
}

#[derive(Debug)]
pub(crate) struct Slot<T: Token> {
    pub(crate) tokens: TokenSet<T>,

    /// Successor edges, kept at node granularity so navigation survives collapse
    pub(crate) successors: FxHashSet<NodeId>,

    /// True once this slot belonged to a collapsed component
    pub(crate) merged: bool,

    /// Signed DFS number; valid only within one optimizer pass
    pub(crate) dfs: i64,

    /// Signed low-link; valid only within one optimizer pass
    pub(crate) low: i64,
}

impl<T: Token> Slot<T> {
    fn new() -> Self {
        Self {
            tokens: TokenSet::new(),
            successors: FxHashSet::default(),
            merged: false,
            dfs: 0,
            low: 0,
        }
    }
}

/// Mutable flow graph with run-to-completion token propagation.
#[derive(Debug)]
pub struct FlowGraph<T: Token> {
    /// Node → slot assigned at creation (identity until a collapse)
    pub(crate) node_slot: Vec<SlotId>,

    /// Union-find over slots; collapse repoints members at the representative
    pub(crate) parent: Vec<SlotId>,

    pub(crate) slots: Vec<Slot<T>>,

    /// Pending (slot, delta) work items
    worklist: VecDeque<(SlotId, Vec<T>)>,

    stats: PropagationStats,
}

impl<T: Token> Default for FlowGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Token> FlowGraph<T> {
    pub fn new() -> Self {
        Self {
            node_slot: Vec::new(),
            parent: Vec::new(),
            slots: Vec::new(),
            worklist: VecDeque::new(),
            stats: PropagationStats::default(),
        }
    }

    /// Allocate a fresh node with an empty token set and no successors.
    pub fn add_node(&mut self) -> NodeId {
        let id = self.slots.len() as NodeId;
        self.node_slot.push(id);
        self.parent.push(id);
        self.slots.push(Slot::new());
        id
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_slot.len()
    }

    /// Union-find lookup with path compression.
    pub(crate) fn find(&mut self, slot: SlotId) -> SlotId {
        let mut root = slot;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        // Compress the walked path
        let mut cur = slot;
        while self.parent[cur as usize] != root {
            let next = self.parent[cur as usize];
            self.parent[cur as usize] = root;
            cur = next;
        }
        root
    }

    /// Read-only union-find lookup (no compression), for `&self` queries.
    fn find_ro(&self, slot: SlotId) -> SlotId {
        let mut root = slot;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        root
    }

    /// Resolve a node to its current slot.
    ///
    /// A node id from a different run (or a foreign graph) is a programming
    /// error and panics; the arena has no record to fall back to.
    pub(crate) fn slot_of(&self, node: NodeId) -> SlotId {
        self.find_ro(self.node_slot[node as usize])
    }

    pub(crate) fn slot_of_mut(&mut self, node: NodeId) -> SlotId {
        let slot = self.node_slot[node as usize];
        self.find(slot)
    }

    /// The node's current token set. Safe mid-run (monotone) and post-run
    /// (stable); shared with all co-members after a collapse.
    pub fn tokens(&self, node: NodeId) -> &TokenSet<T> {
        &self.slots[self.slot_of(node) as usize].tokens
    }

    /// Successor navigation for downstream consumers.
    pub fn successors(&self, node: NodeId) -> &FxHashSet<NodeId> {
        &self.slots[self.slot_of(node) as usize].successors
    }

    /// Whether this node was folded into a collapsed component.
    pub fn is_merged(&self, node: NodeId) -> bool {
        self.slots[self.slot_of(node) as usize].merged
    }

    /// Register the edge `src → dst` and immediately replay `src`'s current
    /// tokens into `dst`, so graph construction order cannot change the
    /// final fixpoint. Drains to quiescence before returning.
    pub fn add_successor(&mut self, src: NodeId, dst: NodeId) {
        let s = self.slot_of_mut(src);
        let d = self.slot_of_mut(dst);
        // An edge within one slot carries no information
        if s == d {
            return;
        }
        if self.slots[s as usize].successors.insert(dst) && !self.slots[s as usize].tokens.is_empty()
        {
            let replay: Vec<T> = self.slots[s as usize].tokens.iter().cloned().collect();
            self.deliver(d, &replay);
            self.drain();
        }
    }

    /// Add tokens to a node and propagate the resulting deltas until the
    /// worklist is empty. Idempotent: re-injecting held tokens is a no-op.
    pub fn inject_tokens(&mut self, node: NodeId, tokens: impl IntoIterator<Item = T>) {
        self.stats.injections += 1;
        let slot = self.slot_of_mut(node);
        let candidates: Vec<T> = tokens.into_iter().collect();
        self.deliver(slot, &candidates);
        self.drain();
    }

    /// Merge `candidates` into a slot's token set; if anything was new,
    /// enqueue exactly the delta for forwarding.
    fn deliver(&mut self, slot: SlotId, candidates: &[T]) {
        let delta = self.slots[slot as usize].tokens.missing_from(candidates.iter());
        if delta.is_empty() {
            return;
        }
        self.slots[slot as usize].tokens.extend(delta.iter().cloned());
        self.stats.propagations += 1;
        self.stats.deltas_enqueued += 1;
        self.worklist.push_back((slot, delta));
    }

    /// Enqueue a deferred work item without touching the slot's own tokens.
    /// Used by the optimizer to send a collapsed component's unified set to
    /// its external successors exactly once.
    pub(crate) fn enqueue(&mut self, slot: SlotId, delta: Vec<T>) {
        if !delta.is_empty() {
            self.stats.deltas_enqueued += 1;
            self.worklist.push_back((slot, delta));
        }
    }

    /// Drain the worklist to quiescence. Termination: token sets only grow
    /// and only non-empty deltas are enqueued.
    pub(crate) fn drain(&mut self) {
        while let Some((slot, delta)) = self.worklist.pop_front() {
            self.stats.drained += 1;
            // The slot may have been folded into a representative since the
            // item was enqueued
            let owner = self.find(slot);
            let succs: Vec<NodeId> = self.slots[owner as usize]
                .successors
                .iter()
                .copied()
                .collect();
            for succ in succs {
                let target = self.slot_of_mut(succ);
                if target == owner {
                    continue;
                }
                self.deliver(target, &delta);
            }
        }
        tracing::trace!(
            drained = self.stats.drained,
            "worklist quiescent"
        );
    }

    pub fn stats(&self) -> &PropagationStats {
        &self.stats
    }
}
