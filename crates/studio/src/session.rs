//! The editing session: one occupancy store, one ground grid, one set of
//! physics settings.
//!
//! Each user action runs to completion (placement or removal plus its whole
//! cascade) before the next one starts. Hosts that share a session between
//! tasks wrap it in [`SharedSession`] and hold the lock for the full action.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use plotstack_engine::change::BlockChange;
use plotstack_engine::physics::PhysicsConfig;
use plotstack_engine::placement::{PlacementError, PlacementResolver};
use plotstack_engine::world::block::BlockColor;
use plotstack_engine::world::grid::GridIndex;
use plotstack_engine::world::position::ColumnPos;
use plotstack_engine::world::OccupancyStore;
use tokio::sync::broadcast;

use crate::boundary::{GeneratedGrid, GridProjection};
use crate::config::StudioConfig;
use crate::dashboard::Metrics;
use crate::event_bus::{self, ChangeSource, RejectionNotice, StudioEvent, WorldChangeBatch};
use crate::intent::{self, Action, Intent};

pub type SharedSession = Arc<Mutex<Session>>;

/// What an action did to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Changed(Vec<BlockChange>),
    /// Nothing to do (no target, empty cell, full column).
    Unchanged,
    Rejected(PlacementError),
}

impl Outcome {
    pub fn changes(&self) -> &[BlockChange] {
        match self {
            Outcome::Changed(changes) => changes,
            _ => &[],
        }
    }
}

pub struct Session {
    store: OccupancyStore,
    grid: GridIndex,
    projection: Option<GridProjection>,
    physics: PhysicsConfig,
    color: BlockColor,
    unit_size_m: f64,
    metrics: Arc<Metrics>,
    bus: broadcast::Sender<StudioEvent>,
}

impl Session {
    pub fn new(config: &StudioConfig, metrics: Arc<Metrics>, bus: broadcast::Sender<StudioEvent>) -> Self {
        Self {
            store: OccupancyStore::new(),
            grid: GridIndex::empty(),
            projection: None,
            physics: config.physics(),
            color: config.color(),
            unit_size_m: config.block_unit_size_m,
            metrics,
            bus,
        }
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn store(&self) -> &OccupancyStore {
        &self.store
    }

    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    pub fn projection(&self) -> Option<&GridProjection> {
        self.projection.as_ref()
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    pub fn unit_size_m(&self) -> f64 {
        self.unit_size_m
    }

    pub fn block_count(&self) -> usize {
        self.store.count()
    }

    pub fn color(&self) -> BlockColor {
        self.color
    }

    pub fn set_color(&mut self, color: BlockColor) {
        self.color = color;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.bus.subscribe()
    }

    fn resolver(&self) -> PlacementResolver<'_> {
        PlacementResolver::new(&self.store, &self.grid, &self.physics)
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Resolve and execute one user intent.
    pub fn apply(&mut self, intent: &Intent) -> Outcome {
        let target_block = match intent.target {
            intent::Target::Block(cell) => self.store.get(cell),
            intent::Target::Grid(_) => None,
        };
        let action = intent::resolve(intent, target_block.as_ref());
        self.execute(action)
    }

    /// Execute an already-resolved action.
    pub fn execute(&mut self, action: Action) -> Outcome {
        let color = self.color;
        let resolver = self.resolver();
        let result = match action {
            Action::Nothing => return Outcome::Unchanged,
            Action::Remove(cell) => {
                let started = Instant::now();
                let changes = resolver.remove(cell);
                if !changes.is_empty() && self.physics.enabled {
                    let collapsed = changes
                        .iter()
                        .filter(|c| matches!(c, BlockChange::Collapsed(_)))
                        .count();
                    self.metrics.record_cascade(collapsed as u64, started.elapsed());
                }
                Ok(changes)
            }
            Action::StackAbove(cell) => resolver.stack_above(cell, color),
            Action::PlaceBelow(cell) => resolver.place_below(cell, color),
            Action::PlaceAdjacent(cell, direction) => resolver.place_adjacent(cell, direction, color),
            Action::PlaceLowest(column) => resolver.place_lowest(column, color),
            Action::PlaceBelowAtColumn(column) => resolver.place_below_at_column(column, color),
        };

        match result {
            Ok(changes) if changes.is_empty() => Outcome::Unchanged,
            Ok(changes) => {
                self.publish_action(&changes);
                Outcome::Changed(changes)
            }
            Err(err) => {
                self.metrics.record_rejected();
                let _ = self.bus.send(StudioEvent::Rejected(RejectionNotice::from_error(&err)));
                Outcome::Rejected(err)
            }
        }
    }

    /// Toggle support enforcement. Re-enabling collapses everything that was
    /// left unsupported while it was off.
    pub fn set_physics(&mut self, enabled: bool) -> Vec<BlockChange> {
        let was_enabled = self.physics.enabled;
        self.physics.enabled = enabled;
        tracing::info!("Physics {}", if enabled { "enabled" } else { "disabled" });
        if enabled && !was_enabled {
            self.collapse()
        } else {
            Vec::new()
        }
    }

    /// Swap in a freshly generated ground grid.
    pub fn replace_grid(&mut self, generated: GeneratedGrid) -> Vec<BlockChange> {
        self.grid = GridIndex::from_cells(generated.cells);
        self.projection = Some(generated.projection);
        tracing::info!("Ground grid replaced: {} cells", self.grid.len());
        if self.physics.enabled {
            self.collapse()
        } else {
            Vec::new()
        }
    }

    /// Replace the ground grid from bare cells, keeping the current projection.
    pub fn replace_grid_cells(&mut self, cells: impl IntoIterator<Item = ColumnPos>) -> Vec<BlockChange> {
        self.grid = GridIndex::from_cells(cells);
        if self.physics.enabled {
            self.collapse()
        } else {
            Vec::new()
        }
    }

    /// Run the cascade to a fixed point and publish what fell.
    pub fn collapse(&mut self) -> Vec<BlockChange> {
        let started = Instant::now();
        let changes = self.resolver().collapse();
        let collapsed = changes.iter().filter(|c| c.is_removal()).count();
        self.metrics.record_cascade(collapsed as u64, started.elapsed());
        if collapsed > 0 {
            tracing::info!("Cascade removed {} unsupported blocks", collapsed);
        }
        self.publish(ChangeSource::Collapse, changes.clone());
        changes
    }

    /// Remove every block.
    pub fn clear(&mut self) -> usize {
        let removed: Vec<BlockChange> = self
            .store
            .clear()
            .into_iter()
            .map(BlockChange::Removed)
            .collect();
        let count = removed.len();
        self.metrics.record_removed(count as u64);
        self.publish(ChangeSource::Session, removed);
        count
    }

    /// Publish changes applied outside the resolver (e.g. an import).
    pub fn announce(&self, changes: Vec<BlockChange>) {
        self.publish(ChangeSource::Session, changes);
    }

    // ── Publishing ───────────────────────────────────────────────────────

    fn publish_action(&self, changes: &[BlockChange]) {
        let mut placed = 0;
        let mut removed = 0;
        for change in changes {
            match change {
                BlockChange::Created(_) => placed += 1,
                BlockChange::Removed(_) => removed += 1,
                _ => {}
            }
        }
        self.metrics.record_placed(placed);
        self.metrics.record_removed(removed);

        let (user, collapse) = event_bus::split_by_source(changes.to_vec());
        self.publish(ChangeSource::User, user);
        self.publish(ChangeSource::Collapse, collapse);
    }

    fn publish(&self, source: ChangeSource, changes: Vec<BlockChange>) {
        self.metrics.set_block_count(self.store.count() as u64);
        if changes.is_empty() {
            return;
        }
        let batch = WorldChangeBatch {
            source,
            changes: changes.into(),
            block_count: self.store.count(),
        };
        // Ignore send errors (no subscribers = no problem).
        let _ = self.bus.send(StudioEvent::Changes(batch));
    }
}
