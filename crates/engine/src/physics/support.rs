use std::collections::{HashSet, VecDeque};

use crate::world::grid::GridIndex;
use crate::world::position::CellPos;
use crate::world::OccupancyStore;

use super::DEFAULT_SEARCH_LIMIT;

/// Decides whether a cell is structurally supported.
///
/// A cell is supported if it is a ground-level cell inside the grid, if the
/// cell directly beneath it is occupied, or if a chain of occupied same-level
/// neighbours leads to a cell that is one of those. The chain search is a
/// breadth-first walk with one visited set for the whole query, seeded with
/// the queried cell so two blocks can never hold each other up.
///
/// Nothing is cached: every query re-derives support from the current store.
/// Queries on an empty cell answer the hypothetical "would a block here be
/// supported".
pub struct SupportValidator<'w> {
    store: &'w OccupancyStore,
    grid: &'w GridIndex,
    search_limit: usize,
}

impl<'w> SupportValidator<'w> {
    pub fn new(store: &'w OccupancyStore, grid: &'w GridIndex) -> Self {
        Self {
            store,
            grid,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_search_limit(mut self, search_limit: usize) -> Self {
        self.search_limit = search_limit.max(1);
        self
    }

    pub fn is_supported(&self, cell: CellPos) -> bool {
        if cell.level < 0 {
            return false;
        }
        self.is_anchored(cell) || self.reaches_anchor(cell)
    }

    /// Ground or direct vertical support, without looking sideways.
    pub fn is_anchored(&self, cell: CellPos) -> bool {
        if cell.level == 0 {
            self.grid.is_grounded(cell.x, cell.z)
        } else {
            self.store.contains(cell.below())
        }
    }

    /// Walk occupied same-level neighbours of `origin` looking for an anchor.
    ///
    /// Each neighbour is tested for an anchor as soon as it is discovered, so
    /// the bound only cuts the search off once every cell it has already
    /// reached has been ruled out.
    fn reaches_anchor(&self, origin: CellPos) -> bool {
        let mut visited = HashSet::with_capacity(self.search_limit);
        visited.insert(origin);
        let mut queue = VecDeque::from([origin]);

        while let Some(cell) = queue.pop_front() {
            for neighbor in cell.horizontal_neighbors() {
                if visited.contains(&neighbor) || !self.store.contains(neighbor) {
                    continue;
                }
                if self.is_anchored(neighbor) {
                    return true;
                }
                if visited.len() >= self.search_limit {
                    tracing::trace!(
                        "Support search from {} hit the {}-cell bound",
                        origin,
                        self.search_limit
                    );
                    return false;
                }
                visited.insert(neighbor);
                queue.push_back(neighbor);
            }
        }

        false
    }
}
