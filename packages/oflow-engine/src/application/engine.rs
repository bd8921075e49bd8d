//! High-level flow analysis engine
//!
//! Facade tying the index layer to the propagation substrate. A front end
//! resolves (entity, context) observations to nodes through the configured
//! sensitivity policy, wires edges as it discovers relationships, injects
//! seed tokens, optionally collapses cycles, and queries final token sets.
//!
//! All per-run state (node store, interner, graph, numbering domain) is owned
//! here; one engine instance per run per thread, torn down by `reset()`.
//!
//! # Usage
//! ```
//! use oflow_engine::application::engine::{EngineConfig, FlowEngine};
//! use oflow_engine::domain::Context;
//!
//! let mut engine: FlowEngine<&str, u32> = FlowEngine::new(EngineConfig::default());
//! let ctx = Context::new();
//!
//! let x = engine.node_for(&"x", &ctx).unwrap();
//! let y = engine.node_for(&"y", &ctx).unwrap();
//! engine.add_successor(x, y);
//! engine.inject_tokens(x, [100]);
//!
//! assert!(engine.tokens(y).contains(&100));
//! ```

use crate::domain::context::Context;
use crate::domain::index::{Entity, Index};
use crate::domain::token::{HashTokenManager, Token, TokenSet};
use crate::errors::Result;
use crate::infrastructure::flow_graph::{FlowGraph, NodeId, PropagationStats};
use crate::infrastructure::index_manager::{
    FlowSensitive, IndexManagement, Insensitive, Interning, PassThrough, SensitivityPolicy,
    SensitivityStrategy, SiteSensitive,
};
use crate::infrastructure::scc_optimizer::{SccOptimizer, SccStats};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Which context dimensions flow into node identity
    pub sensitivity: SensitivityStrategy,

    /// Intern indices through the canonicalization store
    /// (processor-intensive) instead of pass-through (memory-intensive)
    pub interning: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sensitivity: SensitivityStrategy::Insensitive,
            interning: true,
        }
    }
}

/// Combined engine statistics snapshot
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    pub nodes: usize,
    pub indices: usize,
    pub propagation: PropagationStats,
    pub scc: SccStats,
}

/// Generic context-parameterized flow analysis engine.
///
/// `E` is the front end's opaque entity type; `T` the token type flowing
/// through the graph. Single-threaded, run-to-completion (see crate docs).
pub struct FlowEngine<E: Entity + 'static, T: Token> {
    config: EngineConfig,
    policy: Box<dyn SensitivityPolicy<E>>,
    management: Box<dyn IndexManagement<E>>,
    nodes: FxHashMap<Index<E>, NodeId>,
    graph: FlowGraph<T>,
    optimizer: SccOptimizer,
    manager: HashTokenManager,
}

impl<E: Entity + 'static, T: Token> FlowEngine<E, T> {
    /// Engine with the built-in policy named by the configuration.
    pub fn new(config: EngineConfig) -> Self {
        let policy: Box<dyn SensitivityPolicy<E>> = match config.sensitivity {
            SensitivityStrategy::Insensitive => Box::new(Insensitive),
            SensitivityStrategy::FlowSensitive => Box::new(FlowSensitive),
            SensitivityStrategy::SiteSensitive => Box::new(SiteSensitive::unscoped()),
        };
        Self::with_policy(config, policy)
    }

    /// Engine with a caller-supplied sensitivity policy (e.g. a scoped
    /// site-sensitive policy).
    pub fn with_policy(config: EngineConfig, policy: Box<dyn SensitivityPolicy<E>>) -> Self {
        let management: Box<dyn IndexManagement<E>> = if config.interning {
            Box::new(Interning::new())
        } else {
            Box::new(PassThrough)
        };
        Self {
            config,
            policy,
            management,
            nodes: FxHashMap::default(),
            graph: FlowGraph::new(),
            optimizer: SccOptimizer::new(),
            manager: HashTokenManager,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve an observation to its node, creating the node on first sight.
    ///
    /// Fails with `InvalidContext` when the active policy requires a context
    /// dimension the cursor does not carry.
    pub fn node_for(&mut self, entity: &E, ctx: &Context) -> Result<NodeId> {
        let index = self.policy.create_index(entity, ctx)?;
        let index = self.management.equivalent_index(index);
        if let Some(&node) = self.nodes.get(&index) {
            return Ok(node);
        }
        let node = self.graph.add_node();
        self.nodes.insert(index, node);
        Ok(node)
    }

    /// Resolve an observation without creating a node.
    pub fn lookup(&self, entity: &E, ctx: &Context) -> Result<Option<NodeId>> {
        let index = self.policy.create_index(entity, ctx)?;
        Ok(self.nodes.get(&index).copied())
    }

    /// See [`FlowGraph::add_successor`]: registers the edge and eagerly
    /// replays `src`'s current tokens.
    pub fn add_successor(&mut self, src: NodeId, dst: NodeId) {
        self.graph.add_successor(src, dst);
    }

    /// See [`FlowGraph::inject_tokens`]: drains to quiescence before
    /// returning.
    pub fn inject_tokens(&mut self, node: NodeId, tokens: impl IntoIterator<Item = T>) {
        self.graph.inject_tokens(node, tokens);
    }

    /// The node's accumulated token set at the current fixpoint.
    pub fn tokens(&self, node: NodeId) -> &TokenSet<T> {
        self.graph.tokens(node)
    }

    /// Successor-set navigation for consumers that need connectivity
    /// directly (call-graph construction and the like).
    pub fn successors(&self, node: NodeId) -> &FxHashSet<NodeId> {
        self.graph.successors(node)
    }

    pub fn is_merged(&self, node: NodeId) -> bool {
        self.graph.is_merged(node)
    }

    /// Collapse cycles reachable from `roots`. Purely an optimization;
    /// queried token sets are unchanged.
    pub fn optimize(&mut self, roots: &[NodeId]) {
        self.optimizer.optimize(&mut self.graph, roots, &self.manager);
    }

    /// Tear down all per-run state: node store, interner, graph, and the
    /// optimizer's numbering domain.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.management.reset();
        self.graph = FlowGraph::new();
        self.optimizer.reset();
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            nodes: self.graph.node_count(),
            indices: self.nodes.len(),
            propagation: self.graph.stats().clone(),
            scc: self.optimizer.stats().clone(),
        }
    }
}
