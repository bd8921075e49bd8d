//! Domain layer: the value types the engine is parameterized over
//!
//! - **token**: what flows through the graph (union-only sets + factory)
//! - **context**: the sensitivity dimensions of one observation
//! - **index**: canonical identity keys deciding node identity

pub mod context;
pub mod index;
pub mod token;

pub use context::{AllocSiteId, Context, ProgramPointId, DEFAULT_CALL_DEPTH};
pub use index::{Entity, Index};
pub use token::{HashTokenManager, Token, TokenManager, TokenSet};
