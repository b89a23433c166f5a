//! # Sync Loop
//!
//! Periodically fetches authoritative state from the Conversation Store and
//! hands it to a [`SyncTarget`] while the owning view is active.
//!
//! ## Guarantees
//!
//! - **Skip, never queue**: a tick that fires while a previous tick's fetch
//!   of the same activation is still pending is dropped. A new activation
//!   never waits behind a fetch left over from the previous one.
//! - **Bounded fetches**: a fetch that outlives the fetch timeout is
//!   abandoned and counted as a failure, releasing the guard.
//! - **Ordered application**: every fetch takes a sequence number and a
//!   result is applied only if it is newer than the last applied one, so an
//!   out-of-band [`SyncLoop::refresh`] racing a tick cannot roll state back.
//! - **Scoped timer**: the timer task is owned by the loop and aborted by
//!   [`SyncLoop::stop`] or on drop. Fetches already in flight complete but
//!   their results are discarded once the activation they belong to ended.
//! - **Quiet failures**: a failed fetch is logged, the previous state is kept
//!   and the next tick is the only retry.
//!
//! ## Usage
//!
//! ```rust,no_run
//! # use supportdesk::client::sync::{SyncLoop, SyncTarget};
//! # async fn demo<T: SyncTarget>(target: T) {
//! let sync = SyncLoop::new(target, std::time::Duration::from_secs(5));
//! sync.start();
//! // ... view is active ...
//! sync.refresh().await;
//! sync.stop();
//! # }
//! ```

pub mod metrics;
pub mod sync_state;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::client::error::Result;
pub use metrics::SyncMetrics;
pub use sync_state::SyncStatus;

/// Fetch time limit used by [`SyncLoop::new`]
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// What a sync loop keeps fresh
#[async_trait]
pub trait SyncTarget: Send + Sync + 'static {
    /// Fetched state handed to [`SyncTarget::apply`]
    type Snapshot: Send + 'static;

    /// Label used in logs
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Self::Snapshot>;

    /// Fold a fetched snapshot into local state
    fn apply(&self, snapshot: Self::Snapshot);
}

/// Result of one tick or refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Fetched and applied
    Applied,
    /// A fetch was already in flight
    Skipped,
    /// Fetched, but the view was torn down or a newer result was applied
    Discarded,
    /// The fetch failed; previous state retained
    Failed,
    /// The loop is stopped; nothing was fetched
    Inactive,
}

struct LoopInner<T: SyncTarget> {
    target: T,
    active: AtomicBool,
    /// Generation of the activation whose guarded fetch is pending, 0 if none
    in_flight: AtomicU64,
    generation: AtomicU64,
    fetch_timeout: Duration,
    next_seq: AtomicU64,
    applied_seq: Mutex<u64>,
    metrics: Mutex<SyncMetrics>,
}

/// In-flight slot held by one guarded tick of one activation
///
/// A newer activation takes the slot over from an older one; the older
/// guard then leaves it alone on drop.
struct InFlight<'a> {
    slot: &'a AtomicU64,
    generation: u64,
}

impl<'a> InFlight<'a> {
    fn acquire(slot: &'a AtomicU64, generation: u64) -> Option<Self> {
        let mut owner = slot.load(Ordering::Acquire);
        loop {
            if owner >= generation {
                return None;
            }
            match slot.compare_exchange(owner, generation, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return Some(Self { slot, generation }),
                Err(current) => owner = current,
            }
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let _ = self.slot.compare_exchange(
            self.generation,
            0,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

impl<T: SyncTarget> LoopInner<T> {
    fn metrics(&self) -> MutexGuard<'_, SyncMetrics> {
        self.metrics.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn run(&self, guarded: bool) -> TickOutcome {
        if !self.active.load(Ordering::Acquire) {
            return TickOutcome::Inactive;
        }
        let generation = self.generation.load(Ordering::Acquire);

        let _guard = if guarded {
            match InFlight::acquire(&self.in_flight, generation) {
                Some(guard) => Some(guard),
                None => {
                    tracing::debug!("{}: fetch still in flight, skipping tick", self.target.name());
                    self.metrics().record_skip();
                    return TickOutcome::Skipped;
                }
            }
        } else {
            None
        };

        let seq = self.next_seq.fetch_add(1, Ordering::AcqRel) + 1;
        self.metrics().record_sync_start();
        let started = Instant::now();

        let snapshot = match tokio::time::timeout(self.fetch_timeout, self.target.fetch()).await {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                tracing::warn!("{}: sync failed: {}", self.target.name(), e);
                self.metrics().record_sync_failure(e.to_string());
                return TickOutcome::Failed;
            }
            Err(_) => {
                tracing::warn!(
                    "{}: fetch abandoned after {:?}",
                    self.target.name(),
                    self.fetch_timeout
                );
                self.metrics()
                    .record_sync_failure(format!("timed out after {:?}", self.fetch_timeout));
                return TickOutcome::Failed;
            }
        };
        let elapsed = started.elapsed();

        if !self.active.load(Ordering::Acquire)
            || self.generation.load(Ordering::Acquire) != generation
        {
            tracing::debug!("{}: view inactive, discarding fetch #{}", self.target.name(), seq);
            self.metrics().record_discard();
            return TickOutcome::Discarded;
        }

        let mut applied = self.applied_seq.lock().unwrap_or_else(|e| e.into_inner());
        if seq <= *applied {
            tracing::debug!(
                "{}: fetch #{} superseded by #{}, discarding",
                self.target.name(),
                seq,
                *applied
            );
            self.metrics().record_discard();
            return TickOutcome::Discarded;
        }
        *applied = seq;
        self.target.apply(snapshot);
        drop(applied);

        self.metrics().record_sync_success(elapsed);
        TickOutcome::Applied
    }
}

/// Timer-driven fetch-and-apply loop bound to a view's lifetime
pub struct SyncLoop<T: SyncTarget> {
    inner: Arc<LoopInner<T>>,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<T: SyncTarget> SyncLoop<T> {
    pub fn new(target: T, interval: Duration) -> Self {
        Self::with_fetch_timeout(target, interval, DEFAULT_FETCH_TIMEOUT)
    }

    /// Loop whose fetches are abandoned after `fetch_timeout`
    pub fn with_fetch_timeout(target: T, interval: Duration, fetch_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(LoopInner {
                target,
                active: AtomicBool::new(false),
                in_flight: AtomicU64::new(0),
                generation: AtomicU64::new(0),
                fetch_timeout,
                next_seq: AtomicU64::new(0),
                applied_seq: Mutex::new(0),
                metrics: Mutex::new(SyncMetrics::new()),
            }),
            interval,
            task: Mutex::new(None),
        }
    }

    fn task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.task.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn target(&self) -> &T {
        &self.inner.target
    }

    /// Arm the timer; the first tick fires immediately
    ///
    /// Returns `false` without spawning anything if the loop is already
    /// running. Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let mut task = self.task();
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            tracing::debug!("{}: sync loop already running", self.inner.target.name());
            return false;
        }

        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.active.store(true, Ordering::Release);

        let inner = Arc::clone(&self.inner);
        let period = self.interval;
        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let inner = Arc::clone(&inner);
                tokio::spawn(async move {
                    inner.run(true).await;
                });
            }
        }));
        tracing::debug!("{}: sync loop started", self.inner.target.name());
        true
    }

    /// Cancel the timer and disown in-flight fetches
    ///
    /// A disowned fetch runs to completion but its result is discarded and
    /// it does not hold up the next activation.
    pub fn stop(&self) {
        self.inner.active.store(false, Ordering::Release);
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(handle) = self.task().take() {
            handle.abort();
            tracing::debug!("{}: sync loop stopped", self.inner.target.name());
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Run one guarded tick now
    pub async fn tick(&self) -> TickOutcome {
        self.inner.run(true).await
    }

    /// Fetch immediately, ignoring the timer and the in-flight guard
    pub async fn refresh(&self) -> TickOutcome {
        self.inner.run(false).await
    }

    pub fn metrics(&self) -> SyncMetrics {
        self.inner.metrics().clone()
    }

    pub fn status(&self) -> SyncStatus {
        let metrics = self.inner.metrics();
        let generation = self.inner.generation.load(Ordering::Acquire);
        let owner = self.inner.in_flight.load(Ordering::Acquire);
        SyncStatus {
            is_running: self.is_running(),
            is_syncing: owner != 0 && owner == generation,
            generation,
            last_applied: *self.inner.applied_seq.lock().unwrap_or_else(|e| e.into_inner()),
            last_sync: metrics.last_success,
            last_error: metrics.last_error.clone(),
        }
    }
}

impl<T: SyncTarget> Drop for SyncLoop<T> {
    fn drop(&mut self) {
        self.inner.active.store(false, Ordering::Release);
        if let Some(handle) = self.task().take() {
            handle.abort();
        }
    }
}
