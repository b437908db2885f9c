//! Fixed-point removal of unsupported blocks.
//!
//! Each pass takes a snapshot of the occupied cells, evaluates support for
//! all of them against the same store state, then removes the failures.
//! Removing a support can orphan blocks further up or along, so passes repeat
//! until one removes nothing.

use rayon::prelude::*;

use super::support::SupportValidator;
use crate::world::block::Block;
use crate::world::position::CellPos;
use crate::world::OccupancyStore;

/// Outcome of one `collapse_unsupported` run.
#[derive(Debug, Clone, Default)]
pub struct Collapse {
    /// Every block removed, in removal order.
    pub removed: Vec<Block>,
    /// Passes executed, including the final empty one.
    pub passes: usize,
}

impl Collapse {
    pub fn count(&self) -> usize {
        self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Remove unsupported blocks until none remain, evaluating sequentially.
pub fn collapse_unsupported(store: &OccupancyStore, validator: &SupportValidator<'_>) -> Collapse {
    run_passes(store, |cells| {
        cells
            .into_iter()
            .filter(|cell| !validator.is_supported(*cell))
            .collect()
    })
}

/// Same fixed point as [`collapse_unsupported`], with each pass's support
/// checks spread over the rayon pool. Removal itself stays sequential.
pub fn collapse_unsupported_parallel(
    store: &OccupancyStore,
    validator: &SupportValidator<'_>,
) -> Collapse {
    run_passes(store, |cells| {
        cells
            .into_par_iter()
            .filter(|cell| !validator.is_supported(*cell))
            .collect()
    })
}

fn run_passes<F>(store: &OccupancyStore, find_unsupported: F) -> Collapse
where
    F: Fn(Vec<CellPos>) -> Vec<CellPos>,
{
    // Every non-empty pass removes at least one block, so `count + 1` passes
    // always reach the fixed point.
    let max_passes = store.count() + 1;
    let mut collapse = Collapse::default();

    while collapse.passes < max_passes {
        collapse.passes += 1;

        let mut doomed = find_unsupported(store.cells());
        if doomed.is_empty() {
            return collapse;
        }
        doomed.sort_unstable();

        tracing::debug!(
            "Cascade pass {}: removing {} unsupported blocks",
            collapse.passes,
            doomed.len()
        );
        collapse
            .removed
            .extend(doomed.into_iter().filter_map(|cell| store.remove(cell)));
    }

    tracing::warn!(
        "Cascade stopped after {} passes without reaching a fixed point",
        collapse.passes
    );
    collapse
}
