// store.rs — Registry file I/O and integrity digest.
//
// Loading is plain serde_yaml. Saving goes through a temp file in the same
// directory followed by a rename, so a concurrent reader sees either the
// old registry or the new one, never a half-written file. The rename must
// stay within one directory to remain a single filesystem operation.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::RegistryError;
use crate::model::Registry;

/// Load the registry from a YAML file.
pub fn load_registry(path: impl AsRef<Path>) -> Result<Registry, RegistryError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| RegistryError::OpenFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let registry: Registry = serde_yaml::from_str(&data)?;
    Ok(registry)
}

/// Write the registry to a YAML file via temp-file-and-rename.
pub fn save_registry_atomic(
    path: impl AsRef<Path>,
    registry: &Registry,
) -> Result<(), RegistryError> {
    let path = path.as_ref();
    let yaml = serde_yaml::to_string(registry)?;

    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    fs::write(&tmp, yaml).map_err(|source| RegistryError::WriteFailed {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| RegistryError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// SHA-256 digest of the registry's canonical JSON encoding, hex-encoded.
///
/// Hashing the parsed content rather than the raw file means YAML
/// formatting (comments, key order, indentation) does not affect the
/// digest — only the agents and their grants do.
pub fn registry_digest(registry: &Registry) -> Result<String, RegistryError> {
    let canonical = serde_json::to_string(registry)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
