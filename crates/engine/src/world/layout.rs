//! Column height accounting: where a block sits in world space.
//!
//! A block's Y centre is the land base plus the heights of everything below
//! it in the column, plus half its own height. Empty levels below count as one
//! full unit, so a gap keeps the blocks above it where they were.

use super::block::{Block, WorldPos, FULL_HEIGHT};
use super::position::{CellPos, ColumnPos};
use super::OccupancyStore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnLayout {
    /// World Y of the ground surface.
    pub land_base: f32,
    /// Height of a ground block with nothing stacked on it.
    pub thin_base_height: f32,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            land_base: 0.0,
            thin_base_height: 0.1,
        }
    }
}

impl ColumnLayout {
    /// World Y of the bottom face of `cell`, from the stored heights below it.
    pub fn floor_y(&self, store: &OccupancyStore, cell: CellPos) -> f32 {
        let column = cell.column();
        (0..cell.level)
            .map(|level| {
                store
                    .get(column.cell(level))
                    .map_or(FULL_HEIGHT, |b| b.height)
            })
            .fold(self.land_base, |y, height| y + height)
    }

    /// World-space centre of a block of `height` at `cell`.
    pub fn world_pos(&self, store: &OccupancyStore, cell: CellPos, height: f32) -> WorldPos {
        WorldPos {
            x: cell.x as f32,
            y: self.floor_y(store, cell) + height / 2.0,
            z: cell.z as f32,
        }
    }

    /// Recompute the cached world position of every block in `column`.
    ///
    /// Returns the blocks whose position actually moved, already updated in
    /// the store.
    pub fn relayout_column(&self, store: &OccupancyStore, column: ColumnPos) -> Vec<Block> {
        let mut moved = Vec::new();
        let mut floor = self.land_base;
        let mut next_level = 0;

        for mut block in store.column_blocks(column) {
            // Levels skipped since the previous block count as full units.
            for _ in next_level..block.cell.level {
                floor += FULL_HEIGHT;
            }
            let world = WorldPos {
                x: block.cell.x as f32,
                y: floor + block.height / 2.0,
                z: block.cell.z as f32,
            };
            if world != block.world {
                store.set_world(block.cell, world);
                block.world = world;
                moved.push(block);
            }
            floor += block.height;
            next_level = block.cell.level + 1;
        }

        moved
    }
}
