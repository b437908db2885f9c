//! Change event bus between the editing session and its observers.
//!
//! Every action that modifies the store publishes its block changes to a
//! shared `tokio::sync::broadcast` channel; rejected placements publish a
//! short-lived notice for the error indicator. The render layer, the
//! dashboard and tests subscribe independently.

use std::sync::Arc;
use std::time::Duration;

use plotstack_engine::change::BlockChange;
use plotstack_engine::placement::PlacementError;
use plotstack_engine::world::position::CellPos;
use serde::Serialize;

/// Recommended capacity for the broadcast channel.
pub const BUS_CAPACITY: usize = 256;

/// How long a rejection indicator stays visible.
pub const REJECTION_VISIBLE_FOR: Duration = Duration::from_secs(1);

/// Identifies where a batch of changes originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ChangeSource {
    /// A direct user edit (placement, removal, inflation, relayout).
    User,
    /// Blocks removed by the collapse cascade and the relayout that followed.
    Collapse,
    /// Bulk operations: clear, import, grid replacement.
    Session,
}

/// A batch of block changes from a single action.
///
/// Uses `Arc<[...]>` so cloning per broadcast subscriber is just a refcount bump.
#[derive(Clone, Debug)]
pub struct WorldChangeBatch {
    pub source: ChangeSource,
    pub changes: Arc<[BlockChange]>,
    /// Occupied cell count once the batch has been applied.
    pub block_count: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RejectionReason {
    UnsupportedPlacement,
    Occupied,
}

impl From<&PlacementError> for RejectionReason {
    fn from(err: &PlacementError) -> Self {
        match err {
            PlacementError::Unsupported(_) => RejectionReason::UnsupportedPlacement,
            PlacementError::Occupied(_) => RejectionReason::Occupied,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RejectionNotice {
    pub cell: CellPos,
    pub reason: RejectionReason,
    pub visible_for: Duration,
}

impl RejectionNotice {
    pub fn from_error(err: &PlacementError) -> Self {
        let cell = match err {
            PlacementError::Unsupported(cell) | PlacementError::Occupied(cell) => *cell,
        };
        Self {
            cell,
            reason: err.into(),
            visible_for: REJECTION_VISIBLE_FOR,
        }
    }
}

#[derive(Clone, Debug)]
pub enum StudioEvent {
    Changes(WorldChangeBatch),
    Rejected(RejectionNotice),
}

/// Split an action's changes into the user-caused part and the cascade part.
///
/// Updates that follow the first `Collapsed` entry belong to the cascade.
pub fn split_by_source(changes: Vec<BlockChange>) -> (Vec<BlockChange>, Vec<BlockChange>) {
    match changes
        .iter()
        .position(|c| matches!(c, BlockChange::Collapsed(_)))
    {
        Some(at) => {
            let mut user = changes;
            let collapse = user.split_off(at);
            (user, collapse)
        }
        None => (changes, Vec::new()),
    }
}
