// scan.rs — Monthly partition discovery and tolerant JSONL scanning.
//
// The enforcement point writes one partition per calendar month, named
// `policy-enforcement-<YYYYMM>.jsonl`. Discovery matches that convention
// exactly (six digits, nothing else), and lexicographic order of the names
// is chronological order, so no date parsing is needed to sort them.
//
// Scanning favors availability over completeness: the writer is a separate
// process that may crash mid-line, so a line that fails to parse is skipped
// and counted, never surfaced as an error.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::AuditError;
use crate::record::AuditRecord;

/// Result of scanning one or more log partitions.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Every record that parsed cleanly, in file order.
    pub records: Vec<AuditRecord>,
    /// How many lines were skipped as malformed.
    pub skipped_lines: usize,
}

/// List the monthly partitions in a logs directory, sorted by name.
///
/// A missing directory or a directory with no matching files is not an
/// error — it yields an empty list, and the pipeline produces an all-zero
/// summary downstream.
pub fn discover_partitions(logs_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, AuditError> {
    let logs_dir = logs_dir.as_ref();
    if !logs_dir.is_dir() {
        return Ok(Vec::new());
    }

    let name_pattern = Regex::new(r"^policy-enforcement-\d{6}\.jsonl$")?;
    let mut partitions = Vec::new();

    let entries = fs::read_dir(logs_dir).map_err(|source| AuditError::OpenFailed {
        path: logs_dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(AuditError::ReadFailed)?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name_pattern.is_match(name));
        if matches {
            partitions.push(path);
        }
    }

    // Lexicographic == chronological given the YYYYMM naming.
    partitions.sort();
    Ok(partitions)
}

/// Read records from the given partitions, skipping malformed lines.
pub fn scan_partitions(partitions: &[PathBuf]) -> Result<ScanOutcome, AuditError> {
    let mut outcome = ScanOutcome::default();

    for path in partitions {
        let file = File::open(path).map_err(|source| AuditError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditRecord>(&line) {
                Ok(record) => outcome.records.push(record),
                Err(_) => outcome.skipped_lines += 1,
            }
        }

        tracing::debug!(partition = %path.display(), "scanned log partition");
    }

    if outcome.skipped_lines > 0 {
        tracing::debug!(
            skipped = outcome.skipped_lines,
            "skipped malformed audit log lines"
        );
    }
    Ok(outcome)
}

/// Discover and scan every partition in a logs directory.
pub fn scan_logs_dir(logs_dir: impl AsRef<Path>) -> Result<ScanOutcome, AuditError> {
    let partitions = discover_partitions(logs_dir)?;
    scan_partitions(&partitions)
}
