pub mod block;
pub mod grid;
pub mod layout;
pub mod position;

use std::collections::BTreeSet;

use block::Block;
use dashmap::{DashMap, DashSet};
use position::{CellPos, ColumnPos};

/// Sparse occupancy of the build site: cell -> block record.
///
/// Lookups, inserts and removals are O(1). A per-column level index makes
/// column scans (highest block, Y accumulation) independent of the total
/// block count.
///
/// Mutation goes through `&self`: `DashMap` provides interior mutability via
/// per-shard locking, so the placement resolver and the cascade remover can
/// share one store by reference.
pub struct OccupancyStore {
    blocks: DashMap<CellPos, Block>,
    columns: DashMap<ColumnPos, BTreeSet<i32>>,
    /// Columns that have changed since the last `take_dirty_columns`.
    dirty: DashSet<ColumnPos>,
}

impl OccupancyStore {
    pub fn new() -> Self {
        Self {
            blocks: DashMap::new(),
            columns: DashMap::new(),
            dirty: DashSet::new(),
        }
    }

    pub fn get(&self, cell: CellPos) -> Option<Block> {
        self.blocks.get(&cell).map(|b| *b)
    }

    pub fn contains(&self, cell: CellPos) -> bool {
        self.blocks.contains_key(&cell)
    }

    /// Insert a block at its own cell, returning whatever was there before.
    ///
    /// Overwrites unconditionally. Callers that must not clobber an existing
    /// record check `contains` first.
    pub fn put(&self, block: Block) -> Option<Block> {
        let cell = block.cell;
        let previous = self.blocks.insert(cell, block);
        self.columns
            .entry(cell.column())
            .or_default()
            .insert(cell.level);
        self.dirty.insert(cell.column());
        previous
    }

    /// Remove and return the block at `cell`. Absent cells are a no-op.
    pub fn remove(&self, cell: CellPos) -> Option<Block> {
        let (_, block) = self.blocks.remove(&cell)?;
        let column = cell.column();
        let now_empty = match self.columns.get_mut(&column) {
            Some(mut levels) => {
                levels.remove(&cell.level);
                levels.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.columns.remove(&column);
        }
        self.dirty.insert(column);
        Some(block)
    }

    /// Replace the stored record's height. Returns the updated record.
    pub fn set_height(&self, cell: CellPos, height: f32) -> Option<Block> {
        let mut entry = self.blocks.get_mut(&cell)?;
        entry.height = height;
        self.dirty.insert(cell.column());
        Some(*entry)
    }

    /// Replace the cached world position without touching anything else.
    pub(crate) fn set_world(&self, cell: CellPos, world: block::WorldPos) {
        if let Some(mut entry) = self.blocks.get_mut(&cell) {
            entry.world = world;
        }
    }

    /// A snapshot of every block. Safe to hold while mutating the store.
    pub fn all(&self) -> Vec<Block> {
        self.blocks.iter().map(|entry| *entry.value()).collect()
    }

    /// A snapshot of every occupied cell.
    pub fn cells(&self) -> Vec<CellPos> {
        self.blocks.iter().map(|entry| entry.value().cell).collect()
    }

    pub fn count(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Remove everything, returning the removed blocks.
    pub fn clear(&self) -> Vec<Block> {
        let removed = self.all();
        for block in &removed {
            self.dirty.insert(block.cell.column());
        }
        self.blocks.clear();
        self.columns.clear();
        removed
    }

    /// Occupied levels of one column, ascending.
    pub fn column_levels(&self, column: ColumnPos) -> Vec<i32> {
        self.columns
            .get(&column)
            .map(|levels| levels.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Blocks of one column, bottom to top.
    pub fn column_blocks(&self, column: ColumnPos) -> Vec<Block> {
        self.column_levels(column)
            .into_iter()
            .filter_map(|level| self.get(column.cell(level)))
            .collect()
    }

    pub fn highest_in_column(&self, column: ColumnPos) -> Option<i32> {
        self.columns
            .get(&column)
            .and_then(|levels| levels.iter().next_back().copied())
    }

    pub fn column_is_empty(&self, column: ColumnPos) -> bool {
        !self.columns.contains_key(&column)
    }

    /// Lowest free level at or above `from` in `column`.
    pub fn first_free_at_or_above(&self, column: ColumnPos, from: i32) -> i32 {
        let mut level = from.max(0);
        while self.contains(column.cell(level)) {
            level += 1;
        }
        level
    }

    /// Highest free level at or below `from` in `column`, or `None` when the
    /// column is full all the way down to the ground.
    pub fn first_free_at_or_below(&self, column: ColumnPos, from: i32) -> Option<i32> {
        (0..=from).rev().find(|&level| !self.contains(column.cell(level)))
    }

    /// Drain and return the columns modified since the last call.
    pub fn take_dirty_columns(&self) -> Vec<ColumnPos> {
        let dirty: Vec<ColumnPos> = self.dirty.iter().map(|c| *c).collect();
        for column in &dirty {
            self.dirty.remove(column);
        }
        dirty
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }
}

impl Default for OccupancyStore {
    fn default() -> Self {
        Self::new()
    }
}
