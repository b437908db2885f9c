//! Interaction intents and how they map onto placement operations.
//!
//! The render layer does the raycast; what arrives here is the cell it hit,
//! what part of it was hit, and the modifier keys held at the time.

use plotstack_engine::placement::Direction;
use plotstack_engine::world::block::Block;
use plotstack_engine::world::position::{CellPos, ColumnPos};

/// Tolerance for deciding a click point lies on a block's top face.
const TOP_FACE_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// An existing block.
    Block(CellPos),
    /// An empty ground-grid cell.
    Grid(ColumnPos),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    /// Normal of the face the ray struck.
    Face([f32; 3]),
    /// World-space point where the ray struck.
    Point([f32; 3]),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intent {
    pub target: Target,
    pub hit: Hit,
    pub modifiers: Modifiers,
}

impl Intent {
    pub fn click_block(cell: CellPos, hit: Hit) -> Self {
        Self {
            target: Target::Block(cell),
            hit,
            modifiers: Modifiers::default(),
        }
    }

    pub fn click_grid(column: ColumnPos) -> Self {
        Self {
            target: Target::Grid(column),
            hit: Hit::None,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.modifiers.alt = true;
        self
    }
}

/// The engine operation an intent resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Remove(CellPos),
    StackAbove(CellPos),
    PlaceBelow(CellPos),
    PlaceAdjacent(CellPos, Direction),
    PlaceLowest(ColumnPos),
    PlaceBelowAtColumn(ColumnPos),
    Nothing,
}

/// Resolve `intent` against the block it targets (if it still exists).
///
/// A block target whose record is gone (removed between raycast and click)
/// resolves to `Action::Nothing`.
pub fn resolve(intent: &Intent, target_block: Option<&Block>) -> Action {
    match intent.target {
        Target::Grid(column) => {
            if intent.modifiers.shift {
                Action::Nothing
            } else if intent.modifiers.alt {
                Action::PlaceBelowAtColumn(column)
            } else {
                Action::PlaceLowest(column)
            }
        }
        Target::Block(cell) => {
            let Some(block) = target_block else {
                return Action::Nothing;
            };
            if intent.modifiers.shift {
                return Action::Remove(cell);
            }
            if intent.modifiers.alt {
                return Action::PlaceBelow(cell);
            }
            match intent.hit {
                Hit::Face(normal) => from_face(cell, normal),
                Hit::Point(point) => from_point(block, point),
                Hit::None => Action::StackAbove(cell),
            }
        }
    }
}

fn from_face(cell: CellPos, normal: [f32; 3]) -> Action {
    let horizontal = normal[0].abs().max(normal[2].abs());
    if normal[1].abs() >= horizontal {
        if normal[1] < 0.0 {
            Action::PlaceBelow(cell)
        } else {
            Action::StackAbove(cell)
        }
    } else {
        match Direction::from_face_normal(normal) {
            Some(direction) => Action::PlaceAdjacent(cell, direction),
            None => Action::StackAbove(cell),
        }
    }
}

fn from_point(block: &Block, point: [f32; 3]) -> Action {
    if point[1] >= block.top() - TOP_FACE_EPSILON {
        return Action::StackAbove(block.cell);
    }
    let dx = point[0] - block.world.x;
    let dz = point[2] - block.world.z;
    match Direction::dominant(dx, dz) {
        Some(direction) => Action::PlaceAdjacent(block.cell, direction),
        None => Action::StackAbove(block.cell),
    }
}
