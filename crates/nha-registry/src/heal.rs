// heal.rs — Self-healing checker for the live registry.
//
// Validates the live registry against a known-good backup snapshot and,
// when authorized, restores it. The state machine is small and strict:
//
//   Healthy -> {Drifted, Corrupted} -> (auto_reload ? Restored : Reported)
//
// Reported is terminal for the run — the process exits non-zero and the
// corrupted file is left untouched byte-for-byte. No silent repair.
//
// This module is the only writer of the live registry in the entire
// pipeline; every other stage treats it as read-only.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::model::Registry;
use crate::store::{registry_digest, save_registry_atomic};

/// A known-good snapshot of the registry, stored as JSON.
///
/// `sha256` is the digest of the canonical JSON encoding of the content at
/// snapshot time (see [`registry_digest`]); the checker compares the live
/// registry's digest against it when signature checking is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryBackup {
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// Digest of the snapshotted content.
    pub sha256: String,
    /// The snapshotted agent entries.
    pub nhas: Vec<crate::model::AgentRegistryEntry>,
}

impl RegistryBackup {
    /// Snapshot a registry, stamping the current time and content digest.
    pub fn capture(registry: &Registry) -> Result<Self, RegistryError> {
        Ok(Self {
            saved_at: Utc::now(),
            sha256: registry_digest(registry)?,
            nhas: registry.nhas.clone(),
        })
    }

    /// The registry content this backup would restore.
    pub fn registry(&self) -> Registry {
        Registry {
            nhas: self.nhas.clone(),
        }
    }
}

/// Load a backup snapshot from a JSON file.
pub fn load_backup(path: impl AsRef<Path>) -> Result<RegistryBackup, RegistryError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| RegistryError::OpenFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let backup: RegistryBackup = serde_json::from_str(&data)?;
    Ok(backup)
}

/// Write a backup snapshot to a JSON file.
pub fn save_backup(path: impl AsRef<Path>, backup: &RegistryBackup) -> Result<(), RegistryError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| RegistryError::WriteFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let json = serde_json::to_string_pretty(backup)?;
    fs::write(path, json).map_err(|source| RegistryError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Health classification of the live registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// The registry is structurally valid and (if checked) matches the backup.
    Healthy,
    /// The registry parses but its content diverged from the backup digest.
    Drifted,
    /// The registry is unreadable, unparseable, or structurally invalid.
    Corrupted,
    /// A problem was found and the registry was restored from backup.
    Restored,
    /// A problem was found and left in place for manual intervention.
    Reported,
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::Drifted => write!(f, "drifted"),
            HealthState::Corrupted => write!(f, "corrupted"),
            HealthState::Restored => write!(f, "restored"),
            HealthState::Reported => write!(f, "reported"),
        }
    }
}

/// What the checker should verify and whether it may repair.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    /// Compare the live registry's digest against the backup's.
    pub check_signature: bool,
    /// Restore from backup when drift or corruption is found.
    pub auto_reload: bool,
}

/// Outcome of one self-healing run.
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Terminal state for this run.
    pub state: HealthState,
    /// What was found, one line per problem. Empty when healthy.
    pub problems: Vec<String>,
}

impl CheckReport {
    /// Whether the run ended in a state that needs manual intervention.
    pub fn needs_intervention(&self) -> bool {
        self.state == HealthState::Reported
    }
}

/// Classify the live registry without mutating anything.
fn classify(
    registry_file: &Path,
    backup_file: &Path,
    options: &CheckOptions,
) -> Result<(HealthState, Vec<String>), RegistryError> {
    let mut problems = Vec::new();

    // Structural checks: readable, parseable, required fields present.
    let data = match fs::read_to_string(registry_file) {
        Ok(data) => data,
        Err(source) => {
            problems.push(format!(
                "registry file {} is unreadable: {}",
                registry_file.display(),
                source
            ));
            return Ok((HealthState::Corrupted, problems));
        }
    };
    let registry: Registry = match serde_yaml::from_str(&data) {
        Ok(registry) => registry,
        Err(err) => {
            problems.push(format!("registry is not valid YAML: {}", err));
            return Ok((HealthState::Corrupted, problems));
        }
    };
    for (index, entry) in registry.nhas.iter().enumerate() {
        if entry.id.is_empty() {
            problems.push(format!("entry #{} is missing required field 'id'", index));
        }
    }
    if !problems.is_empty() {
        return Ok((HealthState::Corrupted, problems));
    }

    // Signature check: digest of live content vs. the backup's stored digest.
    if options.check_signature {
        let backup = load_backup(backup_file)?;
        let live_digest = registry_digest(&registry)?;
        if live_digest != backup.sha256 {
            problems.push(format!(
                "registry digest {} does not match backup digest {} (saved {})",
                live_digest, backup.sha256, backup.saved_at
            ));
            return Ok((HealthState::Drifted, problems));
        }
    }

    Ok((HealthState::Healthy, problems))
}

/// Check the live registry and, when authorized, restore it from backup.
///
/// Returns the terminal [`CheckReport`]. A missing or unparseable backup is
/// only an error when the backup is actually needed (signature check or
/// restore); a plain structural check runs without one.
pub fn check_registry(
    registry_file: impl AsRef<Path>,
    backup_file: impl AsRef<Path>,
    options: &CheckOptions,
) -> Result<CheckReport, RegistryError> {
    let registry_file = registry_file.as_ref();
    let backup_file = backup_file.as_ref();

    let (state, problems) = classify(registry_file, backup_file, options)?;
    if state == HealthState::Healthy {
        tracing::debug!(registry = %registry_file.display(), "registry healthy");
        return Ok(CheckReport { state, problems });
    }

    for problem in &problems {
        tracing::warn!(%problem, "registry problem detected");
    }

    if !options.auto_reload {
        return Ok(CheckReport {
            state: HealthState::Reported,
            problems,
        });
    }

    // Restore path. The backup must load; a restore from a bad backup would
    // replace one corruption with another.
    let backup = load_backup(backup_file).map_err(|err| RegistryError::BackupUnavailable {
        path: backup_file.to_path_buf(),
        reason: err.to_string(),
    })?;
    let restored = backup.registry();
    let restored_digest = registry_digest(&restored)?;
    if restored_digest != backup.sha256 {
        return Err(RegistryError::BackupUnavailable {
            path: backup_file.to_path_buf(),
            reason: "backup content does not match its own digest".to_string(),
        });
    }

    save_registry_atomic(registry_file, &restored)?;
    tracing::info!(
        registry = %registry_file.display(),
        backup = %backup_file.display(),
        agents = restored.nhas.len(),
        "registry restored from backup"
    );

    let mut problems = problems;
    problems.push(format!(
        "restored {} agent(s) from backup saved {}",
        restored.nhas.len(),
        backup.saved_at
    ));
    Ok(CheckReport {
        state: HealthState::Restored,
        problems,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgentRegistryEntry, Capability};
    use tempfile::tempdir;

    fn sample_registry() -> Registry {
        Registry {
            nhas: vec![AgentRegistryEntry {
                id: "nha:rag-worker".to_string(),
                name: "rag-worker".to_string(),
                category: "mlops".to_string(),
                capabilities: vec![Capability {
                    scopes: vec!["read:rag".to_string()],
                }],
                permissions: vec![],
                secrets: vec![],
            }],
        }
    }

    fn write_live_and_backup(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let registry = sample_registry();
        let live = dir.join("agents.yaml");
        save_registry_atomic(&live, &registry).unwrap();
        let backup_path = dir.join("out/registry.json");
        let backup = RegistryBackup::capture(&registry).unwrap();
        save_backup(&backup_path, &backup).unwrap();
        (live, backup_path)
    }

    #[test]
    fn healthy_registry_passes() {
        let dir = tempdir().unwrap();
        let (live, backup) = write_live_and_backup(dir.path());
        let report = check_registry(
            &live,
            &backup,
            &CheckOptions {
                check_signature: true,
                auto_reload: false,
            },
        )
        .unwrap();
        assert_eq!(report.state, HealthState::Healthy);
        assert!(report.problems.is_empty());
    }

    #[test]
    fn structural_check_runs_without_backup() {
        let dir = tempdir().unwrap();
        let live = dir.path().join("agents.yaml");
        save_registry_atomic(&live, &sample_registry()).unwrap();
        let report = check_registry(
            &live,
            dir.path().join("missing.json"),
            &CheckOptions::default(),
        )
        .unwrap();
        assert_eq!(report.state, HealthState::Healthy);
    }

    #[test]
    fn corrupted_yaml_is_reported_and_untouched_without_auto_reload() {
        let dir = tempdir().unwrap();
        let (live, backup) = write_live_and_backup(dir.path());
        fs::write(&live, "nhas: [ {id: ").unwrap();
        let before = fs::read(&live).unwrap();

        let report = check_registry(&live, &backup, &CheckOptions::default()).unwrap();
        assert_eq!(report.state, HealthState::Reported);
        assert!(report.needs_intervention());
        assert!(!report.problems.is_empty());
        // Fail-closed: corrupted file left byte-for-byte intact.
        assert_eq!(fs::read(&live).unwrap(), before);
    }

    #[test]
    fn corrupted_yaml_restores_with_auto_reload() {
        let dir = tempdir().unwrap();
        let (live, backup) = write_live_and_backup(dir.path());
        fs::write(&live, "nhas: [ {id: ").unwrap();

        let report = check_registry(
            &live,
            &backup,
            &CheckOptions {
                check_signature: false,
                auto_reload: true,
            },
        )
        .unwrap();
        assert_eq!(report.state, HealthState::Restored);

        let restored = crate::store::load_registry(&live).unwrap();
        assert_eq!(restored, sample_registry());
    }

    #[test]
    fn missing_id_is_structural_corruption() {
        let dir = tempdir().unwrap();
        let (live, backup) = write_live_and_backup(dir.path());
        fs::write(&live, "nhas:\n  - name: \"anonymous\"\n").unwrap();

        let report = check_registry(&live, &backup, &CheckOptions::default()).unwrap();
        assert_eq!(report.state, HealthState::Reported);
        assert!(report.problems[0].contains("missing required field 'id'"));
    }

    #[test]
    fn drift_detected_only_with_signature_check() {
        let dir = tempdir().unwrap();
        let (live, backup) = write_live_and_backup(dir.path());

        // Edit the live registry out from under the backup.
        let mut edited = sample_registry();
        edited.nhas[0].permissions.push("run.invoker".to_string());
        save_registry_atomic(&live, &edited).unwrap();

        let without = check_registry(&live, &backup, &CheckOptions::default()).unwrap();
        assert_eq!(without.state, HealthState::Healthy);

        let with = check_registry(
            &live,
            &backup,
            &CheckOptions {
                check_signature: true,
                auto_reload: false,
            },
        )
        .unwrap();
        assert_eq!(with.state, HealthState::Reported);
        assert!(with.problems[0].contains("does not match backup digest"));
    }

    #[test]
    fn drift_restores_with_auto_reload() {
        let dir = tempdir().unwrap();
        let (live, backup) = write_live_and_backup(dir.path());
        let mut edited = sample_registry();
        edited.nhas[0].secrets.push("nha/rag-worker/rogue".to_string());
        save_registry_atomic(&live, &edited).unwrap();

        let report = check_registry(
            &live,
            &backup,
            &CheckOptions {
                check_signature: true,
                auto_reload: true,
            },
        )
        .unwrap();
        assert_eq!(report.state, HealthState::Restored);
        assert_eq!(crate::store::load_registry(&live).unwrap(), sample_registry());
    }

    #[test]
    fn restore_without_backup_is_fatal() {
        let dir = tempdir().unwrap();
        let live = dir.path().join("agents.yaml");
        fs::write(&live, "nhas: [ {id: ").unwrap();

        let result = check_registry(
            &live,
            dir.path().join("missing.json"),
            &CheckOptions {
                check_signature: false,
                auto_reload: true,
            },
        );
        assert!(matches!(
            result,
            Err(RegistryError::BackupUnavailable { .. })
        ));
    }

    #[test]
    fn tampered_backup_refuses_to_restore() {
        let dir = tempdir().unwrap();
        let (live, backup_path) = write_live_and_backup(dir.path());
        fs::write(&live, "nhas: [ {id: ").unwrap();

        // Tamper with the backup content without updating its digest.
        let mut backup = load_backup(&backup_path).unwrap();
        backup.nhas[0].permissions.push("storage.objectCreator".to_string());
        save_backup(&backup_path, &backup).unwrap();

        let result = check_registry(
            &live,
            &backup_path,
            &CheckOptions {
                check_signature: false,
                auto_reload: true,
            },
        );
        assert!(matches!(
            result,
            Err(RegistryError::BackupUnavailable { .. })
        ));
    }
}
