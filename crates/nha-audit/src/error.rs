// error.rs — Error types for the audit-log read side.
//
// Uses `thiserror` to derive the standard Rust `Error` trait automatically.
// Note what is NOT here: malformed JSON lines and unparseable timestamps are
// data-quality conditions handled per record by the scanner, never errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while discovering or reading log partitions.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Failed to open a log partition file.
    #[error("failed to open log partition at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read from a log partition.
    #[error("failed to read log partition: {0}")]
    ReadFailed(#[from] std::io::Error),

    /// The partition filename pattern failed to compile.
    #[error("invalid partition name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
