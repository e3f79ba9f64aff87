// Engine error types

use thiserror::Error;

/// Errors raised by the embedded query engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Statement preparation or execution failed, including rejected SQL text.
    #[error("query engine error: {0}")]
    Engine(#[from] duckdb::Error),

    /// The shared connection lock was poisoned by a panicking thread.
    #[error("query engine connection lock poisoned")]
    Poisoned,
}
