use super::position::CellPos;

/// Height of one full block, in grid units.
pub const FULL_HEIGHT: f32 = 1.0;

/// Packed `0xRRGGBB` colour. The engine stores it without interpreting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockColor(pub u32);

impl BlockColor {
    pub const fn new(rgb: u32) -> Self {
        Self(rgb & 0xFF_FFFF)
    }

    pub const fn rgb(&self) -> u32 {
        self.0
    }
}

/// Cached world-space centre of a block, in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One placed block.
///
/// `height` is below [`FULL_HEIGHT`] only for a thin ground cap. `world` is
/// derived from the heights below it in the column and is refreshed by the
/// store whenever those change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub cell: CellPos,
    pub height: f32,
    pub color: BlockColor,
    pub world: WorldPos,
}

impl Block {
    pub fn new(cell: CellPos, height: f32, color: BlockColor) -> Self {
        Self {
            cell,
            height,
            color,
            world: WorldPos::default(),
        }
    }

    pub fn is_thin(&self) -> bool {
        self.height < FULL_HEIGHT
    }

    /// World Y of the block's upper face.
    pub fn top(&self) -> f32 {
        self.world.y + self.height / 2.0
    }
}
