//! # nha-collect
//!
//! The Collector — first stage of the adaptive policy pipeline.
//!
//! Reads the monthly audit log partitions overlapping a time window,
//! filters to DENY (optionally plus WARN) decisions, and aggregates them
//! into a [`CollectionSummary`]: ranked frequency tables by agent, action,
//! scope, and reason, plus per-agent drill-down matrices and the two
//! heuristic side-tables (`missing_scopes`, `missing_secrets`) the
//! analyzer feeds on.
//!
//! The Collector is a pure batch transform: records in, summary out. All
//! file placement lives in the CLI so each stage's output stays an
//! inspectable checkpoint.

pub mod collector;
pub mod markdown;
pub mod summary;

pub use collector::{collect, collect_logs_dir, CollectOptions};
pub use markdown::render_markdown;
pub use summary::{ActionCount, CollectionSummary, CountEntry, ScopeCount};
