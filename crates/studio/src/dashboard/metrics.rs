//! Lock-free editing counters.
//!
//! The session updates these via atomic operations while it holds its lock;
//! the dashboard reads them at its own pace and never takes that lock.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Monotonic counters
    blocks_placed: AtomicU64,
    placements_rejected: AtomicU64,
    blocks_removed: AtomicU64,
    blocks_collapsed: AtomicU64,
    cascades_completed: AtomicU64,
    cascade_ns_sum: AtomicU64,

    // Latency histogram buckets (cascade duration)
    hist_under_10us: AtomicU64,
    hist_10_100us: AtomicU64,
    hist_100us_1ms: AtomicU64,
    hist_1_10ms: AtomicU64,
    hist_over_10ms: AtomicU64,

    // Gauges
    block_count: AtomicU64,

    started_at: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            blocks_placed: AtomicU64::new(0),
            placements_rejected: AtomicU64::new(0),
            blocks_removed: AtomicU64::new(0),
            blocks_collapsed: AtomicU64::new(0),
            cascades_completed: AtomicU64::new(0),
            cascade_ns_sum: AtomicU64::new(0),
            hist_under_10us: AtomicU64::new(0),
            hist_10_100us: AtomicU64::new(0),
            hist_100us_1ms: AtomicU64::new(0),
            hist_1_10ms: AtomicU64::new(0),
            hist_over_10ms: AtomicU64::new(0),
            block_count: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    pub fn record_placed(&self, blocks: u64) {
        self.blocks_placed.fetch_add(blocks, Relaxed);
    }

    pub fn record_rejected(&self) {
        self.placements_rejected.fetch_add(1, Relaxed);
    }

    pub fn record_removed(&self, blocks: u64) {
        self.blocks_removed.fetch_add(blocks, Relaxed);
    }

    /// Called after each cascade run, whether or not it removed anything.
    pub fn record_cascade(&self, collapsed: u64, duration: Duration) {
        self.cascades_completed.fetch_add(1, Relaxed);
        self.blocks_collapsed.fetch_add(collapsed, Relaxed);
        self.cascade_ns_sum
            .fetch_add(duration.as_nanos() as u64, Relaxed);

        let us = duration.as_micros() as u64;
        let bucket = match us {
            0..=9 => &self.hist_under_10us,
            10..=99 => &self.hist_10_100us,
            100..=999 => &self.hist_100us_1ms,
            1_000..=9_999 => &self.hist_1_10ms,
            _ => &self.hist_over_10ms,
        };
        bucket.fetch_add(1, Relaxed);
    }

    pub fn set_block_count(&self, count: u64) {
        self.block_count.store(count, Relaxed);
    }

    /// Read all counters into a serializable snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.started_at.elapsed().as_secs_f64(),
            block_count: self.block_count.load(Relaxed),
            blocks_placed: self.blocks_placed.load(Relaxed),
            placements_rejected: self.placements_rejected.load(Relaxed),
            blocks_removed: self.blocks_removed.load(Relaxed),
            blocks_collapsed: self.blocks_collapsed.load(Relaxed),
            cascades_total: self.cascades_completed.load(Relaxed),
            cascade_ns_sum: self.cascade_ns_sum.load(Relaxed),
            hist: [
                self.hist_under_10us.load(Relaxed),
                self.hist_10_100us.load(Relaxed),
                self.hist_100us_1ms.load(Relaxed),
                self.hist_1_10ms.load(Relaxed),
                self.hist_over_10ms.load(Relaxed),
            ],
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable snapshot of all metrics at a point in time.
#[derive(Clone, Debug, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: f64,
    pub block_count: u64,
    pub blocks_placed: u64,
    pub placements_rejected: u64,
    pub blocks_removed: u64,
    pub blocks_collapsed: u64,
    pub cascades_total: u64,
    pub cascade_ns_sum: u64,
    /// `[<10μs, 10-100μs, 100μs-1ms, 1-10ms, >10ms]`
    pub hist: [u64; 5],
}
