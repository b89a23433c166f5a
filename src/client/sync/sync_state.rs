//! # Sync State
//!
//! Point-in-time view of a sync loop, for status lines and tests.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    /// Timer armed
    pub is_running: bool,
    /// A guarded tick is waiting on the store
    pub is_syncing: bool,
    /// Activation cycle; bumps on every start and stop
    pub generation: u64,
    /// Sequence number of the last applied fetch
    pub last_applied: u64,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SyncStatus {
    /// Whether the last fetch failed
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }
}
