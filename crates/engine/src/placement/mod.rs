//! Turning a resolved user intent into changes to the occupancy store.
//!
//! Every placement variant resolves a target cell and then goes through
//! [`PlacementResolver::place`], which validates support (unless told not to),
//! inserts the block, applies thin-base inflation and refreshes the column's
//! cached world positions. "No target found" is not an error: the variant
//! returns an empty change list.

pub mod direction;

use thiserror::Error;

use crate::change::BlockChange;
use crate::physics::cascade::{self, Collapse};
use crate::physics::support::SupportValidator;
use crate::physics::PhysicsConfig;
use crate::world::block::{Block, BlockColor, FULL_HEIGHT};
use crate::world::grid::GridIndex;
use crate::world::position::{CellPos, ColumnPos};
use crate::world::OccupancyStore;

pub use direction::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("no support for a block at {0}")]
    Unsupported(CellPos),
    #[error("cell {0} is already occupied")]
    Occupied(CellPos),
}

/// Whether `place` checks support before inserting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Enforce,
    /// Used when filling a gap under existing blocks.
    Skip,
}

pub type PlacementResult = Result<Vec<BlockChange>, PlacementError>;

/// Applies placement and removal requests to a borrowed store.
///
/// Holds no state of its own; construct one per action.
pub struct PlacementResolver<'w> {
    store: &'w OccupancyStore,
    grid: &'w GridIndex,
    config: &'w PhysicsConfig,
}

impl<'w> PlacementResolver<'w> {
    pub fn new(store: &'w OccupancyStore, grid: &'w GridIndex, config: &'w PhysicsConfig) -> Self {
        Self {
            store,
            grid,
            config,
        }
    }

    pub fn validator(&self) -> SupportValidator<'w> {
        SupportValidator::new(self.store, self.grid)
            .with_search_limit(self.config.support_search_limit)
    }

    // ── Core placement ───────────────────────────────────────────────────

    /// Place a block at exactly `target`.
    ///
    /// With physics enabled and `Validation::Enforce`, the cell must be
    /// supported as the store stands now, i.e. before this block exists.
    /// A rejected placement leaves the store untouched.
    pub fn place(&self, target: CellPos, color: BlockColor, validation: Validation) -> PlacementResult {
        if target.level < 0 {
            return Ok(Vec::new());
        }
        if self.store.contains(target) {
            return Err(PlacementError::Occupied(target));
        }
        if self.config.enabled
            && validation == Validation::Enforce
            && !self.validator().is_supported(target)
        {
            tracing::debug!("Rejected placement at {}: unsupported", target);
            return Err(PlacementError::Unsupported(target));
        }

        let column = target.column();
        let height = if target.level == 0 && self.store.column_is_empty(column) {
            self.config.layout.thin_base_height
        } else {
            FULL_HEIGHT
        };

        let mut changes = Vec::new();

        // A block landing on a thin ground cap inflates the cap to full height.
        if target.level == 1 {
            let ground = column.cell(0);
            if self.store.get(ground).is_some_and(|b| b.is_thin()) {
                self.store.set_height(ground, FULL_HEIGHT);
            }
        }

        let mut block = Block::new(target, height, color);
        block.world = self.config.layout.world_pos(self.store, target, height);
        self.store.put(block);

        changes.extend(
            self.config
                .layout
                .relayout_column(self.store, column)
                .into_iter()
                .filter(|moved| moved.cell != target)
                .map(BlockChange::Updated),
        );
        changes.push(BlockChange::Created(block));
        Ok(changes)
    }

    // ── Derived placements ───────────────────────────────────────────────

    /// Place in the lowest free level strictly above `reference`, filling
    /// gaps left by earlier removals.
    pub fn stack_above(&self, reference: CellPos, color: BlockColor) -> PlacementResult {
        let level = self
            .store
            .first_free_at_or_above(reference.column(), reference.level.saturating_add(1));
        self.place(reference.column().cell(level), color, Validation::Enforce)
    }

    /// Place in the first free level below `reference`. No-op when the column
    /// is full down to the ground.
    pub fn place_below(&self, reference: CellPos, color: BlockColor) -> PlacementResult {
        match self
            .store
            .first_free_at_or_below(reference.column(), reference.level.saturating_sub(1))
        {
            Some(level) => self.place(reference.column().cell(level), color, Validation::Skip),
            None => Ok(Vec::new()),
        }
    }

    /// Place one step from `reference` in `direction`: at the reference's own
    /// level if that cell is free, otherwise on top of the neighbouring column.
    pub fn place_adjacent(
        &self,
        reference: CellPos,
        direction: Direction,
        color: BlockColor,
    ) -> PlacementResult {
        let (dx, dz) = direction.offset();
        let Some(column) = reference.column().offset(dx, dz) else {
            return Ok(Vec::new());
        };
        let same_level = column.cell(reference.level.max(0));
        let target = if self.store.contains(same_level) {
            let top = self.store.highest_in_column(column).unwrap_or(same_level.level);
            column.cell(top + 1)
        } else {
            same_level
        };
        self.place(target, color, Validation::Enforce)
    }

    /// Fill `column` bottom-up: place at its lowest free level.
    pub fn place_lowest(&self, column: ColumnPos, color: BlockColor) -> PlacementResult {
        let level = self.store.first_free_at_or_above(column, 0);
        self.place(column.cell(level), color, Validation::Enforce)
    }

    /// Fill `column` downward: level 0 when empty, otherwise the first gap
    /// below its highest block. No-op when there is no gap.
    pub fn place_below_at_column(&self, column: ColumnPos, color: BlockColor) -> PlacementResult {
        let Some(top) = self.store.highest_in_column(column) else {
            return self.place(column.cell(0), color, Validation::Enforce);
        };
        match self.store.first_free_at_or_below(column, top.saturating_sub(1)) {
            Some(level) => self.place(column.cell(level), color, Validation::Skip),
            None => Ok(Vec::new()),
        }
    }

    // ── Removal ──────────────────────────────────────────────────────────

    /// Remove the block at `cell`, then (with physics enabled) collapse
    /// everything that lost support. Removing an empty cell changes nothing.
    pub fn remove(&self, cell: CellPos) -> Vec<BlockChange> {
        let Some(removed) = self.store.remove(cell) else {
            return Vec::new();
        };

        let mut changes = vec![BlockChange::Removed(removed)];
        changes.extend(
            self.config
                .layout
                .relayout_column(self.store, cell.column())
                .into_iter()
                .map(BlockChange::Updated),
        );
        if self.config.enabled {
            changes.extend(self.collapse());
        }
        changes
    }

    /// Run the cascade to a fixed point and refresh the affected columns.
    pub fn collapse(&self) -> Vec<BlockChange> {
        let collapse = self.collapse_raw();
        let mut columns: Vec<ColumnPos> = collapse.removed.iter().map(|b| b.cell.column()).collect();
        columns.sort_unstable();
        columns.dedup();

        let mut changes: Vec<BlockChange> = collapse
            .removed
            .into_iter()
            .map(BlockChange::Collapsed)
            .collect();
        for column in columns {
            changes.extend(
                self.config
                    .layout
                    .relayout_column(self.store, column)
                    .into_iter()
                    .map(BlockChange::Updated),
            );
        }
        changes
    }

    fn collapse_raw(&self) -> Collapse {
        let validator = self.validator();
        if self.config.parallel_cascade {
            cascade::collapse_unsupported_parallel(self.store, &validator)
        } else {
            cascade::collapse_unsupported(self.store, &validator)
        }
    }
}
