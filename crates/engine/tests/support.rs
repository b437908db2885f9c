//! Support validator tests: ground rule, vertical rule, horizontal chains,
//! cycle safety and the search bound.

use plotstack_engine::physics::cascade::collapse_unsupported;
use plotstack_engine::physics::support::SupportValidator;
use plotstack_engine::world::block::{Block, BlockColor, FULL_HEIGHT};
use plotstack_engine::world::grid::GridIndex;
use plotstack_engine::world::position::{CellPos, ColumnPos};
use plotstack_engine::world::OccupancyStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn grid(cells: &[(i32, i32)]) -> GridIndex {
    GridIndex::from_cells(cells.iter().map(|&(x, z)| ColumnPos::new(x, z)))
}

/// Insert raw blocks without any validation.
fn store_with(cells: &[(i32, i32, i32)]) -> OccupancyStore {
    let store = OccupancyStore::new();
    for &(x, level, z) in cells {
        store.put(Block::new(CellPos::new(x, level, z), FULL_HEIGHT, BlockColor::default()));
    }
    store
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn grounded_cells_are_always_supported() {
    let grid = grid(&[(0, 0), (3, -2), (7, 7)]);
    let empty = OccupancyStore::new();
    let busy = store_with(&[(0, 0, 0), (1, 0, 0), (3, 0, -2), (3, 1, -2)]);

    for store in [&empty, &busy] {
        let validator = SupportValidator::new(store, &grid);
        for column in grid.iter() {
            assert!(validator.is_supported(column.cell(0)), "{} should be grounded", column);
        }
    }
}

#[test]
fn ground_level_outside_grid_is_unsupported() {
    let grid = grid(&[(0, 0)]);
    let store = OccupancyStore::new();
    let validator = SupportValidator::new(&store, &grid);

    assert!(!validator.is_supported(CellPos::new(5, 0, 5)));
    assert!(!validator.is_supported(CellPos::new(0, -1, 0)));
}

#[test]
fn block_below_gives_vertical_support() {
    let grid = GridIndex::empty();
    // Floating pillar: the bottom is unsupported, but each higher block has
    // something directly beneath it.
    let store = store_with(&[(2, 3, 2), (2, 4, 2), (2, 5, 2)]);
    let validator = SupportValidator::new(&store, &grid);

    assert!(!validator.is_supported(CellPos::new(2, 3, 2)));
    assert!(validator.is_supported(CellPos::new(2, 4, 2)));
    assert!(validator.is_supported(CellPos::new(2, 5, 2)));
    // Hypothetical cell on top of the pillar.
    assert!(validator.is_supported(CellPos::new(2, 6, 2)));
}

#[test]
fn horizontal_chain_reaches_an_anchor() {
    let grid = grid(&[(0, 0)]);
    // Column at x=0 two high, then a cantilever at level 1 out to x=3.
    let store = store_with(&[(0, 0, 0), (0, 1, 0), (1, 1, 0), (2, 1, 0), (3, 1, 0)]);
    let validator = SupportValidator::new(&store, &grid);

    for x in 1..=3 {
        assert!(validator.is_supported(CellPos::new(x, 1, 0)));
    }
    // An empty cell beside the end of the arm would be supported too.
    assert!(validator.is_supported(CellPos::new(4, 1, 0)));
    // But not one level lower with nothing around it.
    assert!(!validator.is_supported(CellPos::new(4, 0, 0)));
}

#[test]
fn floating_pair_does_not_hold_itself_up() {
    let grid = grid(&[(0, 0), (1, 0)]);
    let store = store_with(&[(0, 1, 0), (1, 1, 0)]);
    let validator = SupportValidator::new(&store, &grid);

    assert!(!validator.is_supported(CellPos::new(0, 1, 0)));
    assert!(!validator.is_supported(CellPos::new(1, 1, 0)));
}

#[test]
fn floating_ring_is_unsupported() {
    let grid = GridIndex::empty();
    let store = store_with(&[(0, 2, 0), (1, 2, 0), (1, 2, 1), (0, 2, 1)]);
    let validator = SupportValidator::new(&store, &grid);

    for cell in store.cells() {
        assert!(!validator.is_supported(cell));
    }
}

#[test]
fn ungrounded_ground_block_can_lean_on_grounded_neighbor() {
    let grid = grid(&[(0, 0)]);
    let store = store_with(&[(0, 0, 0), (1, 0, 0)]);
    let validator = SupportValidator::new(&store, &grid);

    assert!(validator.is_supported(CellPos::new(1, 0, 0)));
    assert!(validator.is_supported(CellPos::new(2, 0, 0)));
}

#[test]
fn search_bound_treats_long_chains_as_unsupported() {
    let grid = grid(&[(0, 0)]);
    // Anchor at x=0 then an arm of 30 blocks at level 0 over non-grid land.
    let cells: Vec<(i32, i32, i32)> = (0..=30).map(|x| (x, 0, 0)).collect();
    let store = store_with(&cells);

    let validator = SupportValidator::new(&store, &grid).with_search_limit(8);
    assert!(validator.is_supported(CellPos::new(3, 0, 0)));
    assert!(!validator.is_supported(CellPos::new(10, 0, 0)));

    let generous = SupportValidator::new(&store, &grid).with_search_limit(64);
    assert!(generous.is_supported(CellPos::new(30, 0, 0)));
}

#[test]
fn anchor_near_origin_is_found_inside_a_wide_plate() {
    let grid = grid(&[(0, -2)]);
    // 7x7 plate at level 1; the only block under it is two steps from the
    // centre. The plate has more cells than the search bound.
    let mut cells: Vec<(i32, i32, i32)> = Vec::new();
    for x in -3..=3 {
        for z in -3..=3 {
            cells.push((x, 1, z));
        }
    }
    cells.push((0, 0, -2));
    let store = store_with(&cells);

    let validator = SupportValidator::new(&store, &grid);
    assert!(validator.is_supported(CellPos::new(0, 1, 0)));
    assert!(validator.is_supported(CellPos::new(1, 1, -1)));

    collapse_unsupported(&store, &validator);
    for cell in [(0, 1, 0), (0, 1, -1), (0, 1, -2), (0, 0, -2)] {
        assert!(store.contains(CellPos::new(cell.0, cell.1, cell.2)), "{:?} fell", cell);
    }
}

#[test]
fn cells_at_the_coordinate_edge_do_not_overflow() {
    let grid = GridIndex::empty();
    let store = store_with(&[(i32::MAX, 1, i32::MIN), (i32::MAX - 1, 1, i32::MIN)]);
    let validator = SupportValidator::new(&store, &grid);

    assert!(!validator.is_supported(CellPos::new(i32::MAX, 1, i32::MIN)));
    assert!(!validator.is_supported(CellPos::new(i32::MAX, 2, i32::MAX)));
    assert_eq!(CellPos::new(i32::MAX, 0, i32::MIN).horizontal_neighbors().count(), 2);
}
