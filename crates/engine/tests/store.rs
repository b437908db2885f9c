//! Occupancy store and grid index mechanics.

use plotstack_engine::world::block::{Block, BlockColor, FULL_HEIGHT};
use plotstack_engine::world::grid::GridIndex;
use plotstack_engine::world::position::{CellPos, ColumnPos};
use plotstack_engine::world::OccupancyStore;

fn block(x: i32, level: i32, z: i32) -> Block {
    Block::new(CellPos::new(x, level, z), FULL_HEIGHT, BlockColor::new(0x336699))
}

#[test]
fn put_get_remove() {
    let store = OccupancyStore::new();
    let cell = CellPos::new(4, 2, -7);

    assert!(store.get(cell).is_none());
    assert!(store.put(block(4, 2, -7)).is_none());
    assert_eq!(store.get(cell).map(|b| b.cell), Some(cell));
    assert_eq!(store.count(), 1);

    let removed = store.remove(cell);
    assert_eq!(removed.map(|b| b.cell), Some(cell));
    assert!(store.is_empty());
}

#[test]
fn removing_absent_cell_is_harmless() {
    let store = OccupancyStore::new();
    store.put(block(0, 0, 0));
    store.take_dirty_columns();

    assert!(store.remove(CellPos::new(9, 9, 9)).is_none());
    assert_eq!(store.count(), 1);
    assert_eq!(store.dirty_count(), 0);
}

#[test]
fn put_overwrites_existing_record() {
    let store = OccupancyStore::new();
    store.put(block(1, 0, 1));
    let mut replacement = block(1, 0, 1);
    replacement.color = BlockColor::new(0xFF0000);

    let previous = store.put(replacement);
    assert_eq!(previous.map(|b| b.color), Some(BlockColor::new(0x336699)));
    assert_eq!(store.count(), 1);
    assert_eq!(store.column_levels(ColumnPos::new(1, 1)), vec![0]);
}

#[test]
fn distinct_cells_never_share_a_record() {
    let store = OccupancyStore::new();
    store.put(block(0, 0, 0));

    for far in [
        CellPos::new(1 << 24, 0, 0),
        CellPos::new(0, 0, 1 << 24),
        CellPos::new(0, 1 << 16, 0),
        CellPos::new(-(1 << 24), 0, 0),
        CellPos::new(i32::MAX, i32::MAX, i32::MIN),
    ] {
        assert_eq!(store.get(far), None, "{} aliased the origin", far);
        assert!(!store.contains(far));
    }

    let cells = [
        CellPos::new(0, 0, 0),
        CellPos::new(-1, 0, 0),
        CellPos::new(0, 0, -1),
        CellPos::new(0, 1, 0),
        CellPos::new(1 << 24, 0, 0),
        CellPos::new(0, 1 << 16, 0),
        CellPos::new(-1, 3, -1),
    ];
    for cell in cells {
        store.put(Block::new(cell, FULL_HEIGHT, BlockColor::default()));
    }
    assert_eq!(store.count(), cells.len());
    for cell in cells {
        assert_eq!(store.get(cell).map(|b| b.cell), Some(cell));
    }
}

#[test]
fn snapshot_survives_mutation() {
    let store = OccupancyStore::new();
    for x in 0..10 {
        store.put(block(x, 0, 0));
    }

    let snapshot = store.all();
    for b in &snapshot {
        store.remove(b.cell);
    }
    assert_eq!(snapshot.len(), 10);
    assert!(store.is_empty());
}

#[test]
fn column_queries_track_levels() {
    let store = OccupancyStore::new();
    let column = ColumnPos::new(2, 3);
    for level in [0, 1, 2, 5] {
        store.put(block(2, level, 3));
    }

    assert_eq!(store.highest_in_column(column), Some(5));
    assert_eq!(store.column_levels(column), vec![0, 1, 2, 5]);
    assert_eq!(store.first_free_at_or_above(column, 1), 3);
    assert_eq!(store.first_free_at_or_below(column, 4), Some(4));
    assert_eq!(store.first_free_at_or_below(column, 2), None);

    for level in [0, 1, 2, 5] {
        store.remove(column.cell(level));
    }
    assert!(store.column_is_empty(column));
    assert_eq!(store.highest_in_column(column), None);
}

#[test]
fn dirty_columns_drain_once() {
    let store = OccupancyStore::new();
    store.put(block(0, 0, 0));
    store.put(block(0, 1, 0));
    store.put(block(3, 0, 3));

    let mut dirty = store.take_dirty_columns();
    dirty.sort();
    assert_eq!(dirty, vec![ColumnPos::new(0, 0), ColumnPos::new(3, 3)]);
    assert!(store.take_dirty_columns().is_empty());
}

#[test]
fn grid_index_membership() {
    let grid = GridIndex::from_cells([ColumnPos::new(0, 0), ColumnPos::new(-4, 2)]);

    assert!(grid.is_grounded(0, 0));
    assert!(grid.is_grounded(-4, 2));
    assert!(!grid.is_grounded(2, -4));
    assert_eq!(grid.len(), 2);
    assert!(GridIndex::empty().is_empty());
}
