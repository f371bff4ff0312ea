//! Per-client topic view de-duplication.
//!
//! A view of topic `T` from client `C` is counted at most once per
//! [`DEDUP_WINDOW_SECS`]. State is process-local: several server instances each
//! count one view per window.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Repeat views inside this window are not counted (5 minutes).
pub const DEDUP_WINDOW_SECS: i64 = 5 * 60;

/// Entries older than this are purged on every write (10 minutes).
pub const RETENTION_SECS: i64 = 10 * 60;

/// Last counted view per `(topic_id, client_ip)`.
#[derive(Debug, Default)]
pub struct ViewDeduper {
    seen: Mutex<HashMap<(i64, String), DateTime<Utc>>>,
}

impl ViewDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a view at `now`. Returns whether the view count should be incremented.
    ///
    /// A suppressed view leaves the stored timestamp untouched, so the window
    /// runs from the last *counted* view.
    pub fn record_view(&self, topic_id: i64, client_ip: &str, now: DateTime<Utc>) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());

        let window = Duration::seconds(DEDUP_WINDOW_SECS);
        let retention = Duration::seconds(RETENTION_SECS);

        let key = (topic_id, client_ip.to_string());
        if let Some(last) = seen.get(&key)
            && now - *last < window
        {
            return false;
        }

        seen.insert(key, now);
        seen.retain(|_, last| now - *last <= retention);
        true
    }

    /// Drop the entry for `(topic_id, client_ip)`, so a view whose count never
    /// reached the database is counted on the next attempt.
    pub fn forget(&self, topic_id: i64, client_ip: &str) {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        seen.remove(&(topic_id, client_ip.to_string()));
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
