//! Session identity and backup-file naming

use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

/// Generate a fresh opaque session identifier
pub fn generate_session_id() -> String {
    format!("session-{}", Uuid::new_v4())
}

/// Base filename for a session started at the given local wall-clock time
pub fn base_filename_at(start: DateTime<Local>) -> String {
    format!("motion_{}", start.format("%Y%m%d_%H%M%S"))
}

/// Backup filename for one flushed buffer: `{base}_part{NNN}.csv`
pub fn part_filename(base: &str, index: u32) -> String {
    format!("{}_part{:03}.csv", base, index)
}

/// Current wall-clock time as epoch seconds, for session registration
pub fn epoch_seconds() -> i64 {
    Utc::now().timestamp()
}
