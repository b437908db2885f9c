use crate::world::block::Block;
use crate::world::position::CellPos;

/// A single change to the occupancy store, as reported to the render layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlockChange {
    /// A block was placed.
    Created(Block),
    /// A stored block's height or cached world position changed.
    Updated(Block),
    /// A block was removed on request.
    Removed(Block),
    /// A block was removed by the cascade after losing support.
    Collapsed(Block),
}

impl BlockChange {
    pub fn block(&self) -> &Block {
        match self {
            BlockChange::Created(b)
            | BlockChange::Updated(b)
            | BlockChange::Removed(b)
            | BlockChange::Collapsed(b) => b,
        }
    }

    pub fn cell(&self) -> CellPos {
        self.block().cell
    }

    /// Did this change take a block out of the store?
    pub fn is_removal(&self) -> bool {
        matches!(self, BlockChange::Removed(_) | BlockChange::Collapsed(_))
    }
}
