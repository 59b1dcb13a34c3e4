// window.rs — Aggregation time windows.
//
// Every pipeline run aggregates over one window: a relative lookback
// (last_24h, last_7d), everything since the epoch (all), or an explicit
// absolute range. Bounds are inclusive on both ends — a record stamped
// exactly at the start or end of the window is in.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::record::TS_FORMAT;

/// The time range over which audit records are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// The 24 hours leading up to now.
    Last24h,
    /// The 7 days leading up to now.
    Last7d,
    /// Everything since the Unix epoch.
    All,
    /// An explicit inclusive range.
    Absolute {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl TimeWindow {
    /// Resolve the window to concrete inclusive `[start, end]` bounds.
    ///
    /// `now` is passed in rather than read from the clock so callers (and
    /// tests) control the reference point.
    pub fn bounds(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        match self {
            TimeWindow::Last24h => (now - Duration::hours(24), now),
            TimeWindow::Last7d => (now - Duration::days(7), now),
            TimeWindow::All => (DateTime::UNIX_EPOCH, now),
            TimeWindow::Absolute { from, to } => (*from, *to),
        }
    }

    /// The label used in report filenames (`policy_collect_<label>.json`).
    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::Last24h => "last_24h",
            TimeWindow::Last7d => "last_7d",
            TimeWindow::All => "all",
            TimeWindow::Absolute { .. } => "absolute",
        }
    }
}

/// Parse an ISO-8601 Zulu timestamp (`%Y-%m-%dT%H:%M:%SZ`).
///
/// Used for `--from-ts`/`--to-ts` CLI arguments; unlike record scanning,
/// a parse failure here is a usage error the caller reports.
pub fn parse_zulu(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, TS_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
