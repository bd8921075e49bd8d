//! Infrastructure layer: the propagation substrate
//!
//! - **retrievable_set**: interning store with stored-element retrieval
//! - **index_manager**: sensitivity policies + canonicalization strategies
//! - **flow_graph**: node arena, edges, delta-driven worklist propagation
//! - **scc_optimizer**: iterative Tarjan detection + component collapsing

pub mod flow_graph;
pub mod index_manager;
pub mod retrievable_set;
pub mod scc_optimizer;

pub use flow_graph::{FlowGraph, NodeId, PropagationStats};
pub use index_manager::{
    FlowSensitive, IndexManagement, Insensitive, Interning, PassThrough, SensitivityPolicy,
    SensitivityStrategy, SiteSensitive,
};
pub use retrievable_set::RetrievableSet;
pub use scc_optimizer::{SccOptimizer, SccStats};
