//! Application layer: the engine facade consumers talk to

pub mod engine;

pub use engine::{EngineConfig, EngineStats, FlowEngine};
