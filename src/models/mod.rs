//! Wire and domain types shared by the gateway, session and stores.
//!
//! Everything here mirrors the backend's snake_case JSON. The server is
//! authoritative for all of it; the client only holds cached copies.

mod review;
mod task;
mod task_config;
mod user;


pub use review::*;
pub use task::*;
pub use task_config::*;
pub use user::*;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a backend timestamp.
///
/// The backend emits either RFC 3339 or naive ISO-8601 (`datetime.isoformat()`),
/// the latter is interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}
