//! Error types for oflow-engine
//!
//! Provides unified error handling across the crate. Precondition violations
//! by the caller (a context missing a required dimension, a lookup on an
//! absent canonical index) surface as errors; internal invariant violations
//! are fatal and panic.

use thiserror::Error;

/// Main error type for flow-engine operations
#[derive(Debug, Error)]
pub enum OflowError {
    /// The active sensitivity policy requires a context dimension
    /// that the supplied context does not carry
    #[error("invalid context: {0}")]
    InvalidContext(String),

    /// Lookup of an element that is not present
    #[error("not found: {0}")]
    NotFound(String),

    /// Analysis error
    #[error("analysis error: {0}")]
    Analysis(String),
}

impl OflowError {
    /// Create an invalid-context error
    pub fn invalid_context(msg: impl Into<String>) -> Self {
        OflowError::InvalidContext(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        OflowError::NotFound(msg.into())
    }

    /// Create an internal analysis error
    pub fn internal(msg: impl Into<String>) -> Self {
        OflowError::Analysis(msg.into())
    }
}

/// Result type alias for flow-engine operations
pub type Result<T> = std::result::Result<T, OflowError>;
