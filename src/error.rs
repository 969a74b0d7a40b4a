//! Error types for ShadowPersona

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while generating, deriving, or persisting a dataset
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("I/O failure at {}: {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse table: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl PipelineError {
    /// Wrap an I/O error together with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::IoFailure {
            path: path.into(),
            source,
        }
    }
}
