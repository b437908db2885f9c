//! Live stats dashboard.
//!
//! Contract with the editing session:
//!   • Metrics: atomic counters, updated by the session, read here.
//!   • Changes: the dashboard subscribes to the event bus like any other
//!     observer. It never locks the session.

pub mod metrics;
pub mod server;

use std::sync::Arc;

use plotstack_engine::change::BlockChange;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::event_bus::{ChangeSource, StudioEvent, WorldChangeBatch};

pub use metrics::Metrics;

/// Central state shared via `Arc<DashboardState>`.
pub struct DashboardState {
    pub metrics: Arc<Metrics>,
    bus: broadcast::Sender<StudioEvent>,
}

impl DashboardState {
    pub fn new(metrics: Arc<Metrics>, bus: broadcast::Sender<StudioEvent>) -> Self {
        Self { metrics, bus }
    }

    /// Create a new receiver for studio events (one per WebSocket client).
    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.bus.subscribe()
    }
}

// ── Change snapshot types ────────────────────────────────────────────────

#[derive(Clone, Serialize)]
pub struct ChangeView {
    pub kind: &'static str, // "created" | "updated" | "removed" | "collapsed"
    pub cell: [i32; 3],
    pub height: f32,
    pub color: u32,
    pub world: [f32; 3],
}

#[derive(Clone, Serialize)]
pub struct BatchView {
    pub source: ChangeSource,
    pub block_count: usize,
    pub changes: Vec<ChangeView>,
}

impl From<&BlockChange> for ChangeView {
    fn from(change: &BlockChange) -> Self {
        let kind = match change {
            BlockChange::Created(_) => "created",
            BlockChange::Updated(_) => "updated",
            BlockChange::Removed(_) => "removed",
            BlockChange::Collapsed(_) => "collapsed",
        };
        let b = change.block();
        ChangeView {
            kind,
            cell: [b.cell.x, b.cell.level, b.cell.z],
            height: b.height,
            color: b.color.rgb(),
            world: [b.world.x, b.world.y, b.world.z],
        }
    }
}

impl From<&WorldChangeBatch> for BatchView {
    fn from(batch: &WorldChangeBatch) -> Self {
        BatchView {
            source: batch.source,
            block_count: batch.block_count,
            changes: batch.changes.iter().map(ChangeView::from).collect(),
        }
    }
}
