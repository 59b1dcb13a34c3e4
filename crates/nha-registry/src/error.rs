// error.rs — Error types for the registry subsystem.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, writing, or checking the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to read a registry or backup file.
    #[error("failed to read {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a registry or backup file.
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The registry document is not valid YAML.
    #[error("registry parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The backup document is not valid JSON.
    #[error("backup parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A restore was requested but no usable backup exists.
    #[error("no usable backup at {path}: {reason}")]
    BackupUnavailable { path: PathBuf, reason: String },
}
