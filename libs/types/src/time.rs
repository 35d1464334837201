//! Timestamps in unix seconds
//!
//! Sale windows are compared against the host clock with plain integer
//! comparison; no scheduling is involved.

use chrono::{DateTime, Utc};

/// Seconds since the unix epoch
pub type Timestamp = i64;

/// Current wall-clock time in unix seconds
pub fn unix_now() -> Timestamp {
    Utc::now().timestamp()
}

/// Render a timestamp as RFC 3339 for logs, falling back to the raw number
pub fn to_rfc3339(ts: Timestamp) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}
