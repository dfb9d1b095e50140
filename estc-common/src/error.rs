//! # Error Types
//!
//! Errors shared by the estc crates. Transport-level failures never show up
//! here: the transport logs them and reports the node as disconnected.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the workspace.
pub type EstcResult<T> = Result<T, EstcError>;

/// Errors raised while preparing a cluster client.
#[derive(Debug, Error)]
pub enum EstcError {
    /// Options file could not be read.
    #[error("failed to read options file {}: {source}", .path.display())]
    OptionsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Options document is not valid JSON or has the wrong shape.
    #[error("invalid options: {0}")]
    OptionsFormat(#[from] serde_json::Error),
}
