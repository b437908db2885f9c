/// Largest coordinate magnitude accepted from user input. Keeps level and
/// neighbour arithmetic far away from the `i32` edges.
pub const COORD_LIMIT: i32 = 1 << 30;

/// Discrete cell coordinate: `(x, level, z)`. `level` 0 is the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPos {
    pub x: i32,
    pub level: i32,
    pub z: i32,
}

impl CellPos {
    pub const fn new(x: i32, level: i32, z: i32) -> Self {
        Self { x, level, z }
    }

    /// The grid column this cell stands in.
    pub const fn column(&self) -> ColumnPos {
        ColumnPos {
            x: self.x,
            z: self.z,
        }
    }

    pub const fn below(&self) -> CellPos {
        Self::new(self.x, self.level - 1, self.z)
    }

    /// The same-level neighbours (+X, -X, +Z, -Z). Neighbours that would
    /// overflow `i32` are skipped.
    pub fn horizontal_neighbors(self) -> impl Iterator<Item = CellPos> {
        let CellPos { x, level, z } = self;
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .filter_map(move |(dx, dz)| {
                Some(CellPos::new(x.checked_add(dx)?, level, z.checked_add(dz)?))
            })
    }
}

/// A horizontal grid position, i.e. one column of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnPos {
    pub x: i32,
    pub z: i32,
}

impl ColumnPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    pub const fn cell(&self, level: i32) -> CellPos {
        CellPos::new(self.x, level, self.z)
    }

    /// The column `(dx, dz)` away, or `None` if that overflows `i32`.
    pub fn offset(&self, dx: i32, dz: i32) -> Option<ColumnPos> {
        Some(Self::new(self.x.checked_add(dx)?, self.z.checked_add(dz)?))
    }
}

impl std::fmt::Display for CellPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.level, self.z)
    }
}

impl std::fmt::Display for ColumnPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}
