//! # oflow-engine: generic context-parameterized flow analysis
//!
//! Fixed-point token-propagation substrate for whole-program static
//! analysis of object-oriented programs. Higher-level analyses (call-graph
//! and thread-graph construction, escape analysis, dependence analyses,
//! slicing) are built by configuring and querying this engine; it never
//! inspects the analyzed program itself.
//!
//! Layers:
//! - `domain/`         : tokens, contexts, canonical indices
//! - `infrastructure/` : canonicalization store, index managers, flow graph,
//!   worklist propagation, SCC collapsing
//! - `application/`    : the [`FlowEngine`] facade and its configuration
//!
//! ## Execution model
//! Single-threaded, synchronous, run-to-completion: every mutating call
//! drains the internal worklist before returning, so callers always observe
//! a fixpoint. There is no internal locking; parallel analyses use disjoint
//! engine instances per thread.
//!
//! ## References
//! - Tarjan, R. "Depth-First Search and Linear Graph Algorithms" (1972)
//! - Andersen, L. O. "Program Analysis and Specialization for C" (PhD 1994)
//! - Milanova et al. "Parameterized Object Sensitivity" (TOSEM 2005)

pub mod application;
pub mod domain;
pub mod errors;
pub mod infrastructure;

pub use application::engine::{EngineConfig, EngineStats, FlowEngine};
pub use domain::context::{AllocSiteId, Context, ProgramPointId};
pub use domain::index::{Entity, Index};
pub use domain::token::{HashTokenManager, Token, TokenManager, TokenSet};
pub use errors::{OflowError, Result};
pub use infrastructure::flow_graph::{FlowGraph, NodeId, PropagationStats};
pub use infrastructure::index_manager::SensitivityStrategy;
pub use infrastructure::retrievable_set::RetrievableSet;
pub use infrastructure::scc_optimizer::{SccOptimizer, SccStats};
