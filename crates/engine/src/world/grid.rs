use std::collections::HashSet;

use super::position::ColumnPos;

/// The set of columns inside the generated, boundary-clipped ground grid.
///
/// Built once per boundary and never mutated; a new boundary builds a new
/// index that replaces this one wholesale.
#[derive(Debug, Clone, Default)]
pub struct GridIndex {
    cells: HashSet<ColumnPos>,
}

impl GridIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_cells<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = ColumnPos>,
    {
        Self {
            cells: cells.into_iter().collect(),
        }
    }

    /// Is `(x, z)` part of the ground grid?
    #[inline]
    pub fn is_grounded(&self, x: i32, z: i32) -> bool {
        self.cells.contains(&ColumnPos::new(x, z))
    }

    #[inline]
    pub fn contains(&self, column: ColumnPos) -> bool {
        self.cells.contains(&column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ColumnPos> + '_ {
        self.cells.iter().copied()
    }
}
