// estc-common - Shared options and error definitions for the estc client
//
// This crate defines the configuration contract consumed by the client
// adapters and the error type shared across the workspace.

pub mod error;
pub mod options;

// Re-export for convenience
pub use error::*;
pub use options::*;
