//! Error types for the instrumentation pipeline.
//!
//! Every variant is recoverable from the dispatcher's point of view: the
//! toolchain passthrough still runs after any of them.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type InstrumentResult<T> = Result<T, InstrumentError>;

#[derive(Debug, Error)]
pub enum InstrumentError {
    /// The target file could not be read
    #[error("Error reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The target file is not valid Rust
    #[error("Error parsing {}:{line}:{column}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// No top-level function carries the configured target name
    #[error("Target function `{function}` not found")]
    TargetNotFound { function: String },

    /// The file has no `use` block to extend
    #[error("No import block found in {}", path.display())]
    MissingImports { path: PathBuf },

    /// Names in the configuration cannot be spliced into source
    #[error("Invalid instrumentation config: {0}")]
    InvalidConfig(String),

    /// An anchor captured from the tree does not map into the source text
    #[error("Position {line}:{column} is outside the source text")]
    UnmappedPosition { line: usize, column: usize },

    /// The instrumented text could not be written back
    #[error("Error writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InstrumentError {
    /// Build a parse error from a syn error, keeping its location.
    pub fn parse(path: impl Into<PathBuf>, err: &syn::Error) -> Self {
        let start = err.span().start();
        InstrumentError::Parse {
            path: path.into(),
            line: start.line,
            column: start.column + 1,
            message: err.to_string(),
        }
    }

    /// Precondition failures, as opposed to I/O or syntax problems.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            InstrumentError::TargetNotFound { .. } | InstrumentError::MissingImports { .. }
        )
    }
}
