//! # Sync Metrics
//!
//! Per-loop counters for ticks, their outcomes and fetch latency.

use std::time::Duration;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct SyncMetrics {
    pub total_syncs: u64,
    pub successful_syncs: u64,
    pub failed_syncs: u64,
    /// Ticks dropped because a fetch was already in flight
    pub skipped_syncs: u64,
    /// Fetches that completed but were not applied
    pub discarded_syncs: u64,
    pub average_sync_duration: Duration,
    pub last_sync_duration: Option<Duration>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sync_start(&mut self) {
        self.total_syncs += 1;
    }

    pub fn record_sync_success(&mut self, duration: Duration) {
        self.last_sync_duration = Some(duration);
        self.successful_syncs += 1;
        self.last_success = Some(Utc::now());
        self.last_error = None;

        // Update rolling average
        let n = self.successful_syncs as u32;
        let total_duration = self.average_sync_duration * (n - 1) + duration;
        self.average_sync_duration = total_duration / n;
    }

    pub fn record_sync_failure(&mut self, error: impl Into<String>) {
        self.failed_syncs += 1;
        self.last_error = Some(error.into());
    }

    pub fn record_skip(&mut self) {
        self.skipped_syncs += 1;
    }

    pub fn record_discard(&mut self) {
        self.discarded_syncs += 1;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_syncs == 0 {
            0.0
        } else {
            self.successful_syncs as f64 / self.total_syncs as f64
        }
    }
}
