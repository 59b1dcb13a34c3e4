//! # nha-audit
//!
//! Audit record model and log scanning for the NHA policy pipeline.
//!
//! The enforcement point writes one policy decision per line into monthly
//! JSONL partitions (`policy-enforcement-<YYYYMM>.jsonl`). This crate owns
//! the read side: the [`AuditRecord`] data model, time-window resolution,
//! partition discovery, and a tolerant scanner that skips malformed lines
//! instead of aborting the run.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use nha_audit::{scan_logs_dir, TimeWindow};
//!
//! let outcome = scan_logs_dir("logs").unwrap();
//! let (start, end) = TimeWindow::Last24h.bounds(chrono::Utc::now());
//! let in_window = outcome
//!     .records
//!     .iter()
//!     .filter(|r| r.parsed_ts().is_some_and(|ts| ts >= start && ts <= end));
//! ```

// Module declarations — each `mod foo;` tells Rust to look for `foo.rs`
// in the same directory and include it as a submodule.
pub mod error;
pub mod record;
pub mod scan;
pub mod window;

// Re-export the main types at the crate root for convenience.
pub use error::AuditError;
pub use record::{AuditRecord, PolicyResult};
pub use scan::{discover_partitions, scan_logs_dir, scan_partitions, ScanOutcome};
pub use window::{parse_zulu, TimeWindow};
