//! Top-level error handling.
//!
//! Aggregates the per-module error types into the one error the binary
//! surface reports. Fatal errors are printed as `ERROR: <message>` and
//! terminate the process with a non-zero status.

use thiserror::Error;

/// Main error type encompassing every failure the CLI can report.
#[derive(Debug, Error)]
pub enum ImpToolError {
    #[error("{0}")]
    Workflow(#[from] crate::workflow::WorkflowError),

    #[error("{0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("{0}")]
    Api(#[from] crate::api::ApiError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for imptool operations.
pub type ImpToolResult<T> = Result<T, ImpToolError>;
