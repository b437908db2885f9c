//! Collapse cascade: transitive removal, cross-column propagation and the
//! fixed-point guarantee.

use plotstack_engine::change::BlockChange;
use plotstack_engine::physics::cascade::{collapse_unsupported, collapse_unsupported_parallel};
use plotstack_engine::physics::support::SupportValidator;
use plotstack_engine::physics::PhysicsConfig;
use plotstack_engine::placement::{PlacementResolver, Validation};
use plotstack_engine::world::block::BlockColor;
use plotstack_engine::world::grid::GridIndex;
use plotstack_engine::world::position::{CellPos, ColumnPos};
use plotstack_engine::world::OccupancyStore;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const COLOR: BlockColor = BlockColor::new(0x777777);

fn grid(cells: &[(i32, i32)]) -> GridIndex {
    GridIndex::from_cells(cells.iter().map(|&(x, z)| ColumnPos::new(x, z)))
}

fn place_all(resolver: &PlacementResolver<'_>, cells: &[(i32, i32, i32)]) {
    for &(x, level, z) in cells {
        resolver
            .place(CellPos::new(x, level, z), COLOR, Validation::Enforce)
            .expect("supported placement");
    }
}

fn collapsed_cells(changes: &[BlockChange]) -> Vec<CellPos> {
    let mut cells: Vec<CellPos> = changes
        .iter()
        .filter_map(|c| match c {
            BlockChange::Collapsed(b) => Some(b.cell),
            _ => None,
        })
        .collect();
    cells.sort();
    cells
}

/// A tower on a grounded column with a floating arm pointing away, plus
/// an unrelated floating block, all laid down without validation.
fn messy_store() -> OccupancyStore {
    let store = OccupancyStore::new();
    let grid = GridIndex::empty();
    let config = PhysicsConfig {
        enabled: false,
        ..PhysicsConfig::default()
    };
    let resolver = PlacementResolver::new(&store, &grid, &config);
    for (x, level, z) in [
        (0, 0, 0),
        (0, 1, 0),
        (0, 2, 0),
        (1, 2, 0),
        (2, 2, 0),
        (5, 4, 5),
        (6, 0, 6),
        (6, 1, 6),
    ] {
        resolver
            .place(CellPos::new(x, level, z), COLOR, Validation::Skip)
            .unwrap();
    }
    store
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn cross_column_collapse() {
    let store = OccupancyStore::new();
    let grid = grid(&[(0, 0), (1, 0)]);
    let config = PhysicsConfig::default();
    let resolver = PlacementResolver::new(&store, &grid, &config);
    place_all(&resolver, &[(0, 0, 0), (1, 0, 0), (0, 1, 0), (1, 1, 0)]);

    // (0,1,0) loses its block below but leans on (1,1,0), which still stands
    // on (1,0,0).
    let changes = resolver.remove(CellPos::new(0, 0, 0));
    assert!(collapsed_cells(&changes).is_empty());
    assert_eq!(store.count(), 3);

    // Now neither level-1 block has an anchor.
    let changes = resolver.remove(CellPos::new(1, 0, 0));
    assert_eq!(
        collapsed_cells(&changes),
        vec![CellPos::new(0, 1, 0), CellPos::new(1, 1, 0)]
    );
    assert_eq!(store.count(), 0);
}

#[test]
fn removing_tower_base_collapses_whole_tower() {
    let store = OccupancyStore::new();
    let grid = grid(&[(0, 0)]);
    let config = PhysicsConfig::default();
    let resolver = PlacementResolver::new(&store, &grid, &config);
    place_all(&resolver, &[(0, 0, 0), (0, 1, 0), (0, 2, 0), (0, 3, 0), (1, 3, 0)]);

    let changes = resolver.remove(CellPos::new(0, 0, 0));
    assert_eq!(collapsed_cells(&changes).len(), 4);
    assert!(store.is_empty());
}

#[test]
fn collapse_reaches_fixed_point() {
    let store = messy_store();
    let grid = grid(&[(0, 0)]);
    let validator = SupportValidator::new(&store, &grid);

    let first = collapse_unsupported(&store, &validator);
    // Floating (5,4,5) and the ungrounded (6,0,6) column go; the tower and
    // its arm stay.
    assert_eq!(first.count(), 3);
    assert_eq!(store.count(), 5);

    let second = collapse_unsupported(&store, &validator);
    assert_eq!(second.count(), 0);
    assert_eq!(second.passes, 1);
}

#[test]
fn collapse_needs_multiple_passes_for_stacked_orphans() {
    let store = messy_store();
    let grid = GridIndex::empty();
    let validator = SupportValidator::new(&store, &grid);

    let collapse = collapse_unsupported(&store, &validator);
    assert!(store.is_empty());
    assert_eq!(collapse.count(), 8);
    // (0,0,0) goes first, then each level above it in turn.
    assert!(collapse.passes > 2);
}

#[test]
fn parallel_collapse_matches_sequential() {
    let sequential = messy_store();
    let parallel = messy_store();
    let grid = grid(&[(0, 0)]);

    let a = collapse_unsupported(&sequential, &SupportValidator::new(&sequential, &grid));
    let b = collapse_unsupported_parallel(&parallel, &SupportValidator::new(&parallel, &grid));

    let mut left: Vec<CellPos> = a.removed.iter().map(|b| b.cell).collect();
    let mut right: Vec<CellPos> = b.removed.iter().map(|b| b.cell).collect();
    left.sort();
    right.sort();
    assert_eq!(left, right);
    assert_eq!(a.passes, b.passes);
}

#[test]
fn removal_without_physics_does_not_cascade() {
    let store = OccupancyStore::new();
    let grid = grid(&[(0, 0)]);
    let on = PhysicsConfig::default();
    place_all(&PlacementResolver::new(&store, &grid, &on), &[(0, 0, 0), (0, 1, 0)]);

    let off = PhysicsConfig {
        enabled: false,
        ..PhysicsConfig::default()
    };
    let changes = PlacementResolver::new(&store, &grid, &off).remove(CellPos::new(0, 0, 0));
    assert_eq!(changes.iter().filter(|c| c.is_removal()).count(), 1);
    assert_eq!(store.count(), 1);

    // Turning physics back on and collapsing clears the orphan.
    let changes = PlacementResolver::new(&store, &grid, &on).collapse();
    assert_eq!(collapsed_cells(&changes), vec![CellPos::new(0, 1, 0)]);
    assert!(store.is_empty());
}

#[test]
fn removing_empty_cell_changes_nothing() {
    let store = OccupancyStore::new();
    let grid = grid(&[(0, 0)]);
    let config = PhysicsConfig::default();
    let resolver = PlacementResolver::new(&store, &grid, &config);
    place_all(&resolver, &[(0, 0, 0)]);

    assert!(resolver.remove(CellPos::new(3, 3, 3)).is_empty());
    assert_eq!(store.count(), 1);
}
