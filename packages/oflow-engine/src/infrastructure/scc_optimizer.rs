//! SCC-based flow graph optimizer
//!
//! Points-to-style flow graphs are densely cyclic: aliasing relationships
//! close loops, and naive propagation reprocesses every cycle member on every
//! token arrival. This pass detects strongly connected components reachable
//! from a set of roots and collapses each non-trivial component onto one
//! representative slot, so the whole cycle holds a single token set and a
//! single successor set.
//!
//! Two implementation invariants:
//! - The DFS is iterative with an explicit frame stack; analyzed programs
//!   produce flow graphs deep enough to overflow call-stack recursion.
//! - The numbering domain alternates sign once per invocation, and the
//!   magnitude counter is monotone across invocations. "Unvisited in this
//!   pass" is therefore testable from a slot's stored number alone, with no
//!   O(V) reset between passes. `reset()` only restores the sign toggle.
//!
//! Collapsing is an optimization only: queried token sets after quiescence
//! are identical with and without it.

use super::flow_graph::{FlowGraph, NodeId, SlotId};
use crate::domain::token::{Token, TokenManager};
use rustc_hash::FxHashSet;

/// Statistics for SCC collapsing
#[derive(Debug, Clone, Default)]
pub struct SccStats {
    /// Optimizer invocations
    pub passes: usize,

    /// Non-trivial components collapsed
    pub sccs_collapsed: usize,

    /// Member slots folded into representatives
    pub members_merged: usize,

    /// Former intra-component edges removed
    pub self_loops_removed: usize,
}

/// Tarjan-style SCC detector and collapser over a [`FlowGraph`].
#[derive(Debug)]
pub struct SccOptimizer {
    /// Current numbering-domain sign; flips once per `optimize`
    sign: i64,

    /// Monotone magnitude counter, never reset
    counter: i64,

    stats: SccStats,
}

struct Frame {
    slot: SlotId,
    succs: Vec<SlotId>,
    next: usize,
}

impl Default for SccOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SccOptimizer {
    pub fn new() -> Self {
        Self {
            sign: 1,
            counter: 0,
            stats: SccStats::default(),
        }
    }

    /// Detect and collapse every non-trivial SCC reachable from `roots`,
    /// then drain the deferred propagation tasks the collapses produced.
    pub fn optimize<T: Token, M: TokenManager<T>>(
        &mut self,
        graph: &mut FlowGraph<T>,
        roots: &[NodeId],
        manager: &M,
    ) {
        // Enter the fresh numbering domain for this pass
        self.sign = -self.sign;
        let mark = self.counter;
        self.stats.passes += 1;

        let mut on_stack: FxHashSet<SlotId> = FxHashSet::default();
        let mut component_stack: Vec<SlotId> = Vec::new();
        let mut components: Vec<Vec<SlotId>> = Vec::new();

        for &root in roots {
            let slot = graph.slot_of_mut(root);
            if self.visited(graph, slot, mark) {
                continue;
            }
            self.visit_from(
                graph,
                slot,
                mark,
                &mut on_stack,
                &mut component_stack,
                &mut components,
            );
        }

        let found = components.len();
        for members in components {
            self.collapse(graph, members, manager);
        }

        // One drain for all deferred tasks: each unified set travels to its
        // external successors once, not once per former member
        graph.drain();

        tracing::debug!(
            pass = self.stats.passes,
            collapsed = found,
            members = self.stats.members_merged,
            "scc pass complete"
        );
    }

    /// O(1): return the numbering domain to its initial state. The magnitude
    /// counter stays monotone so stale numbers keep reading as unvisited.
    pub fn reset(&mut self) {
        self.sign = 1;
    }

    pub fn stats(&self) -> &SccStats {
        &self.stats
    }

    /// A slot is visited in the current pass iff its number carries the
    /// current sign and a magnitude issued after this pass began.
    fn visited<T: Token>(&self, graph: &FlowGraph<T>, slot: SlotId, mark: i64) -> bool {
        let dfs = graph.slots[slot as usize].dfs;
        dfs != 0 && dfs.signum() == self.sign && dfs.abs() > mark
    }

    fn number<T: Token>(&mut self, graph: &mut FlowGraph<T>, slot: SlotId) {
        self.counter += 1;
        let n = self.sign * self.counter;
        graph.slots[slot as usize].dfs = n;
        graph.slots[slot as usize].low = n;
    }

    /// Resolved, deduplicated successor slots of `slot`.
    fn successor_slots<T: Token>(graph: &mut FlowGraph<T>, slot: SlotId) -> Vec<SlotId> {
        let succ_nodes: Vec<NodeId> = graph.slots[slot as usize]
            .successors
            .iter()
            .copied()
            .collect();
        let mut seen: FxHashSet<SlotId> = FxHashSet::default();
        let mut out = Vec::with_capacity(succ_nodes.len());
        for node in succ_nodes {
            let s = graph.slot_of_mut(node);
            if seen.insert(s) {
                out.push(s);
            }
        }
        out
    }

    /// Iterative Tarjan DFS from one start slot. Lowlink comparisons use
    /// magnitudes; all numbers in a pass share the current sign.
    fn visit_from<T: Token>(
        &mut self,
        graph: &mut FlowGraph<T>,
        start: SlotId,
        mark: i64,
        on_stack: &mut FxHashSet<SlotId>,
        component_stack: &mut Vec<SlotId>,
        components: &mut Vec<Vec<SlotId>>,
    ) {
        self.number(graph, start);
        on_stack.insert(start);
        component_stack.push(start);

        let mut frames = vec![Frame {
            slot: start,
            succs: Self::successor_slots(graph, start),
            next: 0,
        }];

        while let Some(frame) = frames.last_mut() {
            let v = frame.slot;
            if frame.next < frame.succs.len() {
                let w = frame.succs[frame.next];
                frame.next += 1;

                if !self.visited(graph, w, mark) {
                    self.number(graph, w);
                    on_stack.insert(w);
                    component_stack.push(w);
                    frames.push(Frame {
                        slot: w,
                        succs: Self::successor_slots(graph, w),
                        next: 0,
                    });
                } else if on_stack.contains(&w) {
                    let w_dfs = graph.slots[w as usize].dfs;
                    if w_dfs.abs() < graph.slots[v as usize].low.abs() {
                        graph.slots[v as usize].low = w_dfs;
                    }
                }
            } else {
                frames.pop();

                let v_low = graph.slots[v as usize].low;
                if let Some(parent) = frames.last() {
                    let p = parent.slot;
                    if v_low.abs() < graph.slots[p as usize].low.abs() {
                        graph.slots[p as usize].low = v_low;
                    }
                }

                // Root of a component: pop its members
                if v_low == graph.slots[v as usize].dfs {
                    let mut members = Vec::new();
                    loop {
                        let w = component_stack.pop().expect("component stack underflow");
                        on_stack.remove(&w);
                        members.push(w);
                        if w == v {
                            break;
                        }
                    }
                    if members.len() > 1 {
                        components.push(members);
                    }
                }
            }
        }
    }

    /// Fold a component onto its representative slot: one unified token set,
    /// one unified successor set with the membership's own edges removed, and
    /// exactly one deferred propagation task for the unified tokens.
    fn collapse<T: Token, M: TokenManager<T>>(
        &mut self,
        graph: &mut FlowGraph<T>,
        members: Vec<SlotId>,
        manager: &M,
    ) {
        let rep = *members.iter().min().expect("empty component");

        for &m in &members {
            graph.parent[m as usize] = rep;
        }

        let mut unified_tokens = manager.empty_set();
        let mut unified_succs: FxHashSet<NodeId> = FxHashSet::default();
        for &m in &members {
            let tokens = std::mem::take(&mut graph.slots[m as usize].tokens);
            unified_tokens.union_with(&tokens);
            let succs = std::mem::take(&mut graph.slots[m as usize].successors);
            unified_succs.extend(succs);
            graph.slots[m as usize].merged = true;
        }

        // Former intra-component edges would be self-loops on the
        // representative; drop them
        let before = unified_succs.len();
        unified_succs.retain(|&node| graph.slot_of(node) != rep);
        self.stats.self_loops_removed += before - unified_succs.len();

        self.stats.sccs_collapsed += 1;
        self.stats.members_merged += members.len();

        let delta: Vec<T> = unified_tokens.iter().cloned().collect();
        graph.slots[rep as usize].tokens = unified_tokens;
        graph.slots[rep as usize].successors = unified_succs;

        if !graph.slots[rep as usize].successors.is_empty() {
            graph.enqueue(rep, delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::HashTokenManager;

    fn tokens_of(graph: &FlowGraph<u32>, node: NodeId) -> Vec<u32> {
        let mut v: Vec<u32> = graph.tokens(node).iter().copied().collect();
        v.sort_unstable();
        v
    }

    fn three_cycle(g: &mut FlowGraph<u32>) -> (NodeId, NodeId, NodeId) {
        let a = g.add_node();
        let b = g.add_node();
        let c = g.add_node();
        g.add_successor(a, b);
        g.add_successor(b, c);
        g.add_successor(c, a);
        (a, b, c)
    }

    #[test]
    fn test_cycle_collapses_to_shared_slot() {
        let mut g: FlowGraph<u32> = FlowGraph::new();
        let (a, b, c) = three_cycle(&mut g);

        let mut opt = SccOptimizer::new();
        opt.optimize(&mut g, &[a], &HashTokenManager);

        assert!(g.is_merged(a));
        assert!(g.is_merged(b));
        assert!(g.is_merged(c));
        assert_eq!(opt.stats().sccs_collapsed, 1);
        assert_eq!(opt.stats().members_merged, 3);

        // All intra-component edges gone
        assert!(g.successors(a).is_empty());
    }

    #[test]
    fn test_chain_is_untouched() {
        let mut g: FlowGraph<u32> = FlowGraph::new();
        let a = g.add_node();
        let b = g.add_node();
        let c = g.add_node();
        g.add_successor(a, b);
        g.add_successor(b, c);

        let mut opt = SccOptimizer::new();
        opt.optimize(&mut g, &[a], &HashTokenManager);

        assert!(!g.is_merged(a));
        assert_eq!(opt.stats().sccs_collapsed, 0);
    }

    #[test]
    fn test_collapse_preserves_token_sets() {
        let mut with_opt: FlowGraph<u32> = FlowGraph::new();
        let (a1, b1, c1) = three_cycle(&mut with_opt);
        let mut without_opt: FlowGraph<u32> = FlowGraph::new();
        let (a2, b2, c2) = three_cycle(&mut without_opt);

        let mut opt = SccOptimizer::new();
        opt.optimize(&mut with_opt, &[a1], &HashTokenManager);

        for (g, (a, b, c)) in [
            (&mut with_opt, (a1, b1, c1)),
            (&mut without_opt, (a2, b2, c2)),
        ] {
            g.inject_tokens(a, [10]);
            g.inject_tokens(b, [20]);
            g.inject_tokens(c, [30]);
        }

        for node in [a1, b1, c1] {
            assert_eq!(tokens_of(&with_opt, node), vec![10, 20, 30]);
        }
        for node in [a2, b2, c2] {
            assert_eq!(tokens_of(&without_opt, node), vec![10, 20, 30]);
        }
    }

    #[test]
    fn test_collapse_keeps_external_successors() {
        let mut g: FlowGraph<u32> = FlowGraph::new();
        let (a, _b, c) = three_cycle(&mut g);
        let out = g.add_node();
        g.add_successor(c, out);

        g.inject_tokens(a, [1]);

        let mut opt = SccOptimizer::new();
        opt.optimize(&mut g, &[a], &HashTokenManager);

        // External edge survives and the unified set reached it
        assert!(g.successors(a).contains(&out));
        assert_eq!(tokens_of(&g, out), vec![1]);

        // Post-collapse injection still flows outward
        g.inject_tokens(a, [2]);
        assert_eq!(tokens_of(&g, out), vec![1, 2]);
    }

    #[test]
    fn test_collapse_at_fixpoint_keeps_external_results() {
        let mut g: FlowGraph<u32> = FlowGraph::new();
        let (a, b, c) = three_cycle(&mut g);
        let out = g.add_node();
        g.add_successor(b, out);

        // Tokens already inside the cycle before collapsing
        g.inject_tokens(a, [7]);
        g.inject_tokens(c, [8]);

        let mut opt = SccOptimizer::new();
        opt.optimize(&mut g, &[a], &HashTokenManager);

        assert_eq!(tokens_of(&g, out), vec![7, 8]);
    }

    #[test]
    fn test_two_disjoint_cycles() {
        let mut g: FlowGraph<u32> = FlowGraph::new();
        let (a, _, _) = three_cycle(&mut g);
        let x = g.add_node();
        let y = g.add_node();
        g.add_successor(x, y);
        g.add_successor(y, x);

        let mut opt = SccOptimizer::new();
        opt.optimize(&mut g, &[a, x], &HashTokenManager);

        assert_eq!(opt.stats().sccs_collapsed, 2);
        assert_eq!(opt.stats().members_merged, 5);
    }

    #[test]
    fn test_nested_reachability_from_single_root() {
        // root → cycle(b,c,d) → tail
        let mut g: FlowGraph<u32> = FlowGraph::new();
        let root = g.add_node();
        let b = g.add_node();
        let c = g.add_node();
        let d = g.add_node();
        let tail = g.add_node();
        g.add_successor(root, b);
        g.add_successor(b, c);
        g.add_successor(c, d);
        g.add_successor(d, b);
        g.add_successor(d, tail);

        let mut opt = SccOptimizer::new();
        opt.optimize(&mut g, &[root], &HashTokenManager);

        assert_eq!(opt.stats().sccs_collapsed, 1);
        assert!(!g.is_merged(root));
        assert!(!g.is_merged(tail));
        assert!(g.is_merged(b));

        g.inject_tokens(root, [1]);
        assert_eq!(tokens_of(&g, tail), vec![1]);
    }

    #[test]
    fn test_successive_passes_alternate_domain() {
        let mut g: FlowGraph<u32> = FlowGraph::new();
        let (a, _, _) = three_cycle(&mut g);

        let mut opt = SccOptimizer::new();
        opt.optimize(&mut g, &[a], &HashTokenManager);

        // Grow a new cycle and run again without any per-node reset
        let x = g.add_node();
        let y = g.add_node();
        g.add_successor(x, y);
        g.add_successor(y, x);
        opt.optimize(&mut g, &[a, x], &HashTokenManager);

        assert_eq!(opt.stats().passes, 2);
        assert_eq!(opt.stats().sccs_collapsed, 2);
        assert!(g.is_merged(x));
    }

    #[test]
    fn test_reset_is_cheap_and_reusable() {
        let mut opt = SccOptimizer::new();
        let mut g: FlowGraph<u32> = FlowGraph::new();
        let (a, _, _) = three_cycle(&mut g);
        opt.optimize(&mut g, &[a], &HashTokenManager);

        opt.reset();

        let mut g2: FlowGraph<u32> = FlowGraph::new();
        let (a2, b2, _) = three_cycle(&mut g2);
        opt.optimize(&mut g2, &[a2], &HashTokenManager);
        assert!(g2.is_merged(b2));
    }

    #[test]
    fn test_deep_chain_no_stack_overflow() {
        // Deep linear graph ending in a 2-cycle; recursion would overflow here
        let mut g: FlowGraph<u32> = FlowGraph::new();
        let n = 200_000;
        let first = g.add_node();
        let mut prev = first;
        for _ in 1..n {
            let next = g.add_node();
            g.add_successor(prev, next);
            prev = next;
        }
        let back = g.add_node();
        g.add_successor(prev, back);
        g.add_successor(back, prev);

        let mut opt = SccOptimizer::new();
        opt.optimize(&mut g, &[first], &HashTokenManager);
        assert_eq!(opt.stats().sccs_collapsed, 1);
    }
}
